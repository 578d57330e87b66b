/*
 parser of the "task document": a plain text file with sections like

 features
   glazing_area: 0.2
   surface_area: 700
 sweep
   axis: glazing_area
   range: 0.0, 0.4

 every section has a title (a word) and one or more key: value1, value2 pairs. Values are
 parsed as integer, float, boolean or string, in that order. Lines starting with //, #, % or ;
 are comments.
*/
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, multispace0, space0},
    combinator::{map, map_res, recognize},
    multi::{many0, many1, separated_list1},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::path::Path;

pub type SectionMap = HashMap<String, Vec<Value>>;
pub type DocumentMap = HashMap<String, SectionMap>;

/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    pub fn as_string(&self) -> Option<&String> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// integers are accepted where a float is expected: "range: 0, 1"
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

/// a word: letters, digits and underscores, not starting with a digit
fn parse_word(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    let mut parser = map(parser, String::from);
    parser.parse(input)
}

fn parse_value(input: &str) -> IResult<&str, Value> {
    // a single value: anything up to a comma, whitespace or semicolon
    let value_parser = take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\r' | '\n' | ';'));
    let mut value_parser = map_res(value_parser, |s: &str| -> Result<Value, String> {
        if let Ok(val) = s.parse::<i64>() {
            Ok(Value::Integer(val))
        } else if let Ok(val) = s.parse::<f64>() {
            Ok(Value::Float(val))
        } else if let Ok(val) = s.parse::<bool>() {
            Ok(Value::Boolean(val))
        } else {
            Ok(Value::String(s.to_string()))
        }
    });
    value_parser.parse(input)
}

fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    let separator_comma = delimited(space0, tag(","), space0);
    let mut value_parser = separated_list1(separator_comma, parse_value);
    value_parser.parse(input)
}

/// key: value1, value2 ; the values stay on the line of the key
fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    let mut parser = separated_pair(parse_word, colon_separator, parse_value_list);
    let (input, result) = parser.parse(input)?;
    let input = input.trim_start_matches(|c: char| c == ';' || c.is_whitespace());
    Ok((input, result))
}

/// Parses a section with a title and at least one key-value pair
fn parse_section(input: &str) -> IResult<&str, (String, SectionMap)> {
    let (input, title) = parse_word(input)?;
    let (input, _) = multispace0(input)?;
    let mut parser = many1(terminated(parse_key_value_pair, space0));
    let (input, pairs) = parser.parse(input)?;
    let section_map = pairs.into_iter().collect::<SectionMap>();
    Ok((input, (title, section_map)))
}

/// Filters out comment lines (starting with //, #, %, or ;) and blank lines
fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parses the sections of a document. A title met twice merges into one section, later
/// keys winning.
pub fn parse_document(input: &str) -> IResult<&str, DocumentMap> {
    let mut parser = many1(delimited(multispace0, parse_section, multispace0));
    let (input, sections) = parser.parse(input)?;
    let mut result: DocumentMap = HashMap::new();
    for (title, section_map) in sections {
        result.entry(title).or_default().extend(section_map);
    }
    Ok((input, result))
}

/// Typed access to a parsed task document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskDocument {
    sections: DocumentMap,
}

impl TaskDocument {
    /// parses the whole text; unparsed trailing text is an error. An empty (or comment only)
    /// document is valid and has no sections.
    pub fn parse(input: &str) -> Result<TaskDocument, String> {
        let filtered = filter_comments(input);
        if filtered.trim().is_empty() {
            return Ok(TaskDocument::default());
        }
        match parse_document(&filtered) {
            Ok((remaining, sections)) => {
                if !remaining.trim().is_empty() {
                    return Err(format!(
                        "Failed to parse entire document. Remaining: '{}'",
                        remaining
                    ));
                }
                Ok(TaskDocument { sections })
            }
            Err(e) => Err(format!("Parsing error: {:?}", e)),
        }
    }

    pub fn from_file(path: &Path) -> Result<TaskDocument, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    pub fn has_section(&self, title: &str) -> bool {
        self.sections.contains_key(title)
    }

    pub fn section(&self, title: &str) -> Option<&SectionMap> {
        self.sections.get(title)
    }

    /// sorted keys of a section, empty if the section is absent
    pub fn keys(&self, title: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .sections
            .get(title)
            .map(|section| section.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    pub fn values(&self, title: &str, key: &str) -> Option<&Vec<Value>> {
        self.sections.get(title).and_then(|section| section.get(key))
    }

    /// all values of a key as strings (numbers are printed back)
    pub fn strings(&self, title: &str, key: &str) -> Option<Vec<String>> {
        self.values(title, key)
            .map(|values| values.iter().map(|v| v.to_string()).collect())
    }

    pub fn string(&self, title: &str, key: &str) -> Result<Option<String>, String> {
        match self.strings(title, key) {
            None => Ok(None),
            Some(mut values) if values.len() == 1 => Ok(values.pop()),
            Some(values) => Err(format!(
                "{}.{} expects one value, got {}",
                title,
                key,
                values.len()
            )),
        }
    }

    pub fn floats(&self, title: &str, key: &str) -> Result<Option<Vec<f64>>, String> {
        let Some(values) = self.values(title, key) else {
            return Ok(None);
        };
        values
            .iter()
            .map(|v| {
                v.as_number()
                    .ok_or_else(|| format!("{}.{}: '{}' is not a number", title, key, v))
            })
            .collect::<Result<Vec<f64>, String>>()
            .map(Some)
    }

    pub fn float(&self, title: &str, key: &str) -> Result<Option<f64>, String> {
        match self.floats(title, key)? {
            None => Ok(None),
            Some(values) if values.len() == 1 => Ok(Some(values[0])),
            Some(values) => Err(format!(
                "{}.{} expects one number, got {}",
                title,
                key,
                values.len()
            )),
        }
    }

    pub fn counts(&self, title: &str, key: &str) -> Result<Option<Vec<usize>>, String> {
        let Some(values) = self.values(title, key) else {
            return Ok(None);
        };
        values
            .iter()
            .map(|v| {
                v.as_integer()
                    .and_then(|i| usize::try_from(i).ok())
                    .ok_or_else(|| format!("{}.{}: '{}' is not a non-negative integer", title, key, v))
            })
            .collect::<Result<Vec<usize>, String>>()
            .map(Some)
    }

    pub fn boolean(&self, title: &str, key: &str) -> Result<Option<bool>, String> {
        let Some(values) = self.values(title, key) else {
            return Ok(None);
        };
        match values.as_slice() {
            [value] => value
                .as_boolean()
                .map(Some)
                .ok_or_else(|| format!("{}.{}: '{}' is not true or false", title, key, value)),
            _ => Err(format!(
                "{}.{} expects one value, got {}",
                title,
                key,
                values.len()
            )),
        }
    }
}

/////////////////////////////TESTS////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_parse_word() {
        let (remaining, title) = parse_word("sweep\n axis: glazing_area").unwrap();
        assert_eq!(title, "sweep");
        assert_eq!(remaining, "\n axis: glazing_area");
        let (remaining, key) = parse_word("x_range: 0.0, 0.4").unwrap();
        assert_eq!(key, "x_range");
        assert_eq!(remaining, ": 0.0, 0.4");
        assert!(parse_word("1abc").is_err());
    }

    #[test]
    fn test_parse_value() {
        let (remaining, value) = parse_value("quartic_root, next").unwrap();
        assert_eq!(value, Value::String("quartic_root".to_string()));
        assert_eq!(remaining, ", next");
        let (_, value) = parse_value("100").unwrap();
        assert_eq!(value, Value::Integer(100));
        let (_, value) = parse_value("-0.2").unwrap();
        assert_eq!(value, Value::Float(-0.2));
        let (_, value) = parse_value("1e-3").unwrap();
        assert_eq!(value, Value::Float(1e-3));
        let (_, value) = parse_value("false").unwrap();
        assert_eq!(value, Value::Boolean(false));
    }

    #[test]
    fn test_parse_key_value_pair() {
        let (remaining, (key, values)) = parse_key_value_pair("range : 0.0 , 0.4\nnext: 1").unwrap();
        assert_eq!(key, "range");
        assert_eq!(values, vec![Value::Float(0.0), Value::Float(0.4)]);
        assert_eq!(remaining, "next: 1");
        let (remaining, (_, values)) = parse_key_value_pair("count: 50, 50;").unwrap();
        assert_eq!(values, vec![Value::Integer(50), Value::Integer(50)]);
        assert_eq!(remaining, "");
    }

    #[test]
    fn test_parse_section() {
        let input = "grid\n  x_axis: glazing_area\n  count: 50, 40\nlogging\n  level: info";
        let (remaining, (title, map)) = parse_section(input).unwrap();
        assert_eq!(title, "grid");
        assert_eq!(map.len(), 2);
        assert_eq!(map["count"], vec![Value::Integer(50), Value::Integer(40)]);
        assert_eq!(remaining, "logging\n  level: info");
    }

    #[test]
    fn test_document_typed_access() {
        let doc = TaskDocument::parse(
            "# session\nfeatures\n  glazing_area: 0.3\n  height: 5\nsweep\n  axis: glazing_area\n  range: 0, 0.4\n  count: 100\noutput\n  csv: true\n",
        )
        .unwrap();
        assert!(doc.has_section("features"));
        assert!(!doc.has_section("grid"));
        assert_eq!(doc.keys("features"), vec!["glazing_area", "height"]);
        assert_eq!(doc.float("features", "height").unwrap(), Some(5.0));
        assert_eq!(doc.floats("sweep", "range").unwrap(), Some(vec![0.0, 0.4]));
        assert_eq!(doc.counts("sweep", "count").unwrap(), Some(vec![100]));
        assert_eq!(
            doc.string("sweep", "axis").unwrap(),
            Some("glazing_area".to_string())
        );
        assert_eq!(doc.boolean("output", "csv").unwrap(), Some(true));
        assert_eq!(doc.boolean("output", "plots").unwrap(), None);
        assert!(doc.float("sweep", "range").is_err());
        assert!(doc.floats("sweep", "axis").is_err());
        assert!(doc.boolean("sweep", "count").is_err());
    }

    #[test]
    fn test_repeated_section_merges() {
        let doc = TaskDocument::parse("features\n height: 4\nfeatures\n height: 6\n roof_area: 150").unwrap();
        assert_eq!(doc.float("features", "height").unwrap(), Some(6.0));
        assert_eq!(doc.float("features", "roof_area").unwrap(), Some(150.0));
    }

    #[test]
    fn test_empty_and_malformed() {
        assert_eq!(TaskDocument::parse("").unwrap(), TaskDocument::default());
        assert_eq!(TaskDocument::parse("// nothing\n\n").unwrap(), TaskDocument::default());
        assert!(TaskDocument::parse("features").is_err());
        assert!(TaskDocument::parse("features\n height 5").is_err());
        assert!(TaskDocument::parse("features\n height: 5\n !!!").is_err());
    }

    #[test]
    fn test_document_from_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("session.txt");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "source").unwrap();
        writeln!(file, "  kind: closed_form").unwrap();
        writeln!(file, "  variant: quartic_polynomial").unwrap();
        writeln!(file, "logging").unwrap();
        writeln!(file, "  level: debug").unwrap();
        drop(file);

        let doc = TaskDocument::from_file(&file_path).unwrap();
        assert_eq!(
            doc.string("source", "variant").unwrap(),
            Some("quartic_polynomial".to_string())
        );
        assert_eq!(doc.string("logging", "level").unwrap(), Some("debug".to_string()));
        assert!(TaskDocument::from_file(&dir.path().join("missing.txt")).is_err());
    }
}
