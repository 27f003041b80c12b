//! XML `Name` production (XML 1.0 fifth edition, section 2.3).

/// Why a string is not a valid XML name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    Empty,
    InvalidStart(char),
    InvalidChar(char),
}

impl NameError {
    pub fn reason(&self) -> String {
        match self {
            NameError::Empty => "name is empty".to_string(),
            NameError::InvalidStart(c) => format!("'{}' cannot start a name", c.escape_debug()),
            NameError::InvalidChar(c) => format!("'{}' is not allowed in a name", c.escape_debug()),
        }
    }
}

/// Check that `name` matches the XML `Name` production.
///
/// # Examples
///
/// ```
/// use arrayxml::dom::{NameError, validate_name};
///
/// assert!(validate_name("dc:title").is_ok());
/// assert_eq!(validate_name("1st"), Err(NameError::InvalidStart('1')));
/// ```
pub fn validate_name(name: &str) -> Result<(), NameError> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err(NameError::Empty),
        Some(c) if !is_name_start_char(c) => return Err(NameError::InvalidStart(c)),
        Some(_) => {}
    }
    match chars.find(|&c| !is_name_char(c)) {
        Some(c) => Err(NameError::InvalidChar(c)),
        None => Ok(()),
    }
}

pub fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

pub fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}
