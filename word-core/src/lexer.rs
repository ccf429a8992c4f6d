use std::sync::LazyLock;

use regex::Regex;

use crate::error::ErrorKind;

const ARG: &str = r"-?[\w\[\]&]+";

static IGNORED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(;.*)?$").unwrap());

static PREPROCESSOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*#([A-Za-z]+)(\s+({arg})(\s*,\s*({arg})(\s*,\s*({arg}))?)?)?\s*(;.*)?$",
        arg = ARG
    ))
    .unwrap()
});

static INSTRUCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*(?:(\w[\w\d]*)\s*:)?\s*([A-Za-z]+)\s+({arg})(\s*,\s*({arg})(\s*,\s*({arg}))?)?\s*(;.*)?$",
        arg = ARG
    ))
    .unwrap()
});

/// One source line, classified in the §4.1 priority order: ignored,
/// preprocessor directive, instruction, or (falling through all three)
/// syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Ignored,
    Directive {
        name: String,
        args: Vec<String>,
    },
    Instruction {
        label: Option<String>,
        mnemonic: String,
        args: Vec<String>,
    },
}

fn collect_args(caps: &regex::Captures, indices: [usize; 3]) -> Vec<String> {
    indices
        .into_iter()
        .filter_map(|i| caps.get(i).map(|m| m.as_str().to_string()))
        .collect()
}

/// Classify one raw source line. Never fails on its own terms — a line
/// matching none of the three patterns is reported as a `Syntax` error by
/// the caller, which knows the line number.
pub fn parse_line(line: &str) -> Result<ParsedLine, ErrorKind> {
    if IGNORED.is_match(line) {
        return Ok(ParsedLine::Ignored);
    }
    if let Some(caps) = PREPROCESSOR.captures(line) {
        let name = caps.get(1).unwrap().as_str().to_string();
        let args = collect_args(&caps, [3, 5, 7]);
        return Ok(ParsedLine::Directive { name, args });
    }
    if let Some(caps) = INSTRUCTION.captures(line) {
        let label = caps.get(1).map(|m| m.as_str().to_string());
        let mnemonic = caps.get(2).unwrap().as_str().to_string();
        let args = collect_args(&caps, [3, 5, 7]);
        return Ok(ParsedLine::Instruction {
            label,
            mnemonic,
            args,
        });
    }
    Err(ErrorKind::Syntax {
        line: line.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        assert_eq!(parse_line("").unwrap(), ParsedLine::Ignored);
        assert_eq!(parse_line("   ").unwrap(), ParsedLine::Ignored);
        assert_eq!(parse_line("  ; a comment"), Ok(ParsedLine::Ignored));
    }

    #[test]
    fn plain_instruction_line() {
        let parsed = parse_line("MOV eax, ebx").unwrap();
        assert_eq!(
            parsed,
            ParsedLine::Instruction {
                label: None,
                mnemonic: "MOV".to_string(),
                args: vec!["eax".to_string(), "ebx".to_string()],
            }
        );
    }

    #[test]
    fn labelled_instruction_line() {
        let parsed = parse_line("foo:MOV eax, 0").unwrap();
        assert_eq!(
            parsed,
            ParsedLine::Instruction {
                label: Some("foo".to_string()),
                mnemonic: "MOV".to_string(),
                args: vec!["eax".to_string(), "0".to_string()],
            }
        );
    }

    #[test]
    fn three_operand_instruction_with_trailing_comment() {
        let parsed = parse_line("  ADD eax, ebx, ecx ; sum them").unwrap();
        assert_eq!(
            parsed,
            ParsedLine::Instruction {
                label: None,
                mnemonic: "ADD".to_string(),
                args: vec!["eax".to_string(), "ebx".to_string(), "ecx".to_string()],
            }
        );
    }

    #[test]
    fn directive_line() {
        let parsed = parse_line("#CONST foo, 200").unwrap();
        assert_eq!(
            parsed,
            ParsedLine::Directive {
                name: "CONST".to_string(),
                args: vec!["foo".to_string(), "200".to_string()],
            }
        );
    }

    #[test]
    fn unmatched_line_is_syntax_error() {
        assert!(parse_line("%%%not valid%%%").is_err());
    }
}
