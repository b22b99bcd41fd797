//! Documentation content for rela CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Selection,
    Types,
    Errors,
    Relations,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" | "lines" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "selection" | "limit" | "projection" | "brackets" => Some(Self::Selection),
            "types" | "type" => Some(Self::Types),
            "errors" | "error" => Some(Self::Errors),
            "relations" | "input" | "files" => Some(Self::Relations),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"RELA DOCUMENTATION

Rela is a relational-algebra script language. Each line combines or filters
typed relations and binds the result to a new name for later lines.

DOCUMENTATION CATEGORIES

  syntax            Line structure, identifiers, comments
  operators         Union, intersection, difference, product, precedence
  selection         Projection and selection brackets
  types             Numeric, string and date attributes and literals
  errors            Error kinds and their messages
  relations         Relations file format for 'rela run'

QUICK REFERENCE

  A | B -> R        Union
  A & B -> R        Intersection
  A \ B -> R        Difference
  A * B -> R        Cartesian product
  A[x, y] -> R      Projection
  A[x > 1] -> R     Selection

Run 'rela doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Selection) => Ok(SELECTION_DOC),
        Some(DocCategory::Types) => Ok(TYPES_DOC),
        Some(DocCategory::Errors) => Ok(ERRORS_DOC),
        Some(DocCategory::Relations) => Ok(RELATIONS_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX

Every line has the form

  <expression> -> <name>

The expression is evaluated against the relations bound so far and the result
is bound to <name>, replacing any earlier binding with that name.

Identifiers start with an ASCII letter or underscore, followed by ASCII
letters, digits or underscores. Names are case-sensitive.

Blank lines and lines starting with # are ignored.

  # people in both tables
  Users & Admins -> Both
"#;

const OPERATORS_DOC: &str = r#"OPERATORS

Lowest to highest precedence; all binary operators are left-associative.

  &  |  \           Intersection, union, difference
  *                 Cartesian product
  [...]             Projection or selection (postfix)
  ( )               Grouping

Set operators need both sides to have the same attributes, in the same
order, with the same types. Results never contain duplicate rows.

  (Users \ Admins) | (Admins \ Users) -> OnlyOne

Product pairs every left row with every right row. Attributes present on
both sides are renamed to Relation.attribute:

  Users * Admins -> Pairs      # Users.id, Users.name, Admins.id, Admins.name

Unnamed operands (for example a parenthesized union) are labelled _1 on the
left and _2 on the right. A relation multiplied by itself labels the right
side <name>_2.
"#;

const SELECTION_DOC: &str = r#"SELECTION AND PROJECTION

Brackets containing a comparator select rows; otherwise they project.

PROJECTION

  Users[name] -> Names
  (Users * Admins)[Users.name, Admins.name] -> NamePairs

Attributes appear in the order listed. Duplicate rows are kept unless
'rela run --dedup-projection' is given.

SELECTION

  Users[id > 1] -> Later
  Users[name = 'John'] -> Johns
  (Users * Admins)[Users.id = Admins.id] -> Matched

Comparators: =  !=  <  <=  >  >=
The right side is an attribute, a number, or a 'quoted' string.
"#;

const TYPES_DOC: &str = r#"TYPES

  numeric           Decimal numbers; compared numerically
  string            Text; compared lexicographically
  date              YYYY-MM-DD; compared chronologically

Literals take their type from how they are written:

  42, -1, 3.5       numeric
  'John'            string
  '2024-01-31'      date, when compared against a date attribute

Comparing a literal or attribute with an attribute of another type fails.
"#;

const ERRORS_DOC: &str = r#"ERRORS

The first failing line stops the script.

  Syntax error in '<line>': ...
  Undefined relation: <name>
  Cannot apply Union: relations' attribute types don't match
  Cannot apply Projection(a, b): relation's attributes do not include b
  Cannot apply Limit(name=1): 1 is not a string
  Cannot apply Limit(id='John'): 'John' cannot be parsed into a number
"#;

const RELATIONS_DOC: &str = r#"RELATIONS FILE

'rela run --relations <file>' loads a JSON object of relations:

  {
    "Users": {
      "schema": [
        {"name": "id", "type": "numeric"},
        {"name": "name", "type": "string"}
      ],
      "rows": [[1, "John"], [2, "Jane"]]
    }
  }

Date cells are "YYYY-MM-DD" strings. Output uses the same value encoding.
"#;
