// the collection of utility functions for bracket parsing and proceeding

/// true if every ')' closes an earlier '(' and nothing is left open
pub fn brackets_are_balanced(s: &str) -> bool {
    let mut depth: i64 = 0;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

pub fn has_brackets(s: &str) -> bool {
    s.chars().any(|c| c == '(' || c == ')')
}

// code finds the byte position of the bracket closing the one at bracket_start
pub fn find_pair_to_this_bracket(input: &str, bracket_start: usize) -> Option<usize> {
    if input[bracket_start..].chars().next() != Some('(') {
        return None;
    }
    let mut stack = 0;
    for (i, c) in input[bracket_start..].char_indices() {
        match c {
            '(' => stack += 1,
            ')' => {
                stack -= 1;
                if stack == 0 {
                    return Some(bracket_start + i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brackets_are_balanced() {
        assert!(brackets_are_balanced("(x+(y))"));
        assert!(brackets_are_balanced("x"));
        assert!(!brackets_are_balanced("(x"));
        assert!(!brackets_are_balanced(")x("));
        assert!(has_brackets("f(x)"));
        assert!(!has_brackets("x+y"));
    }

    #[test]
    fn test_find_pair_to_this_bracket() {
        let input = "(a+(b))*(c)";
        assert_eq!(find_pair_to_this_bracket(input, 0), Some(6));
        assert_eq!(find_pair_to_this_bracket(input, 3), Some(5));
        assert_eq!(find_pair_to_this_bracket(input, 8), Some(10));
        assert_eq!(find_pair_to_this_bracket(input, 1), None);
        assert_eq!(find_pair_to_this_bracket("(a", 0), None);
    }
}
