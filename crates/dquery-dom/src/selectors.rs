//! CSS Selectors
//!
//! Parsing and matching for the selector subset used by `querySelectorAll`,
//! `matches` and `closest`: compound selectors (type, universal, id, class,
//! attribute, pseudo-class), the four combinators, and selector lists.

use std::fmt;
use std::str::FromStr;

use crate::{DomError, DomResult, DomTree, NodeId};

/// A comma-separated list of complex selectors
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    text: String,
    selectors: Vec<ComplexSelector>,
}

/// Compound selectors joined by combinators, left to right
#[derive(Debug, Clone, PartialEq)]
struct ComplexSelector {
    parts: Vec<SelectorPart>,
}

#[derive(Debug, Clone, PartialEq)]
struct SelectorPart {
    compound: CompoundSelector,
    /// Relation to the part on the left (None for the first part)
    combinator: Option<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

/// Simple selectors that must all match one element
#[derive(Debug, Clone, Default, PartialEq)]
struct CompoundSelector {
    universal: bool,
    tag: Option<String>,
    /// More than one id is valid syntax and simply never matches
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttributeSelector>,
    pseudo_classes: Vec<PseudoClass>,
}

impl CompoundSelector {
    fn is_empty(&self) -> bool {
        !self.universal
            && self.tag.is_none()
            && self.ids.is_empty()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudo_classes.is_empty()
    }
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
struct AttributeSelector {
    name: String,
    matcher: Option<AttributeMatcher>,
    case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Includes(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        let Some(matcher) = &self.matcher else {
            return true;
        };

        let fold = |s: &str| {
            if self.case_insensitive {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        let actual = fold(value);

        match matcher {
            AttributeMatcher::Exact(expected) => actual == fold(expected),
            AttributeMatcher::Includes(expected) => {
                let expected = fold(expected);
                !expected.is_empty() && actual.split_ascii_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                actual == expected || actual.starts_with(&format!("{expected}-"))
            }
            AttributeMatcher::Prefix(expected) => {
                !expected.is_empty() && actual.starts_with(&fold(expected))
            }
            AttributeMatcher::Suffix(expected) => {
                !expected.is_empty() && actual.ends_with(&fold(expected))
            }
            AttributeMatcher::Substring(expected) => {
                !expected.is_empty() && actual.contains(&fold(expected))
            }
        }
    }
}

/// Supported pseudo-classes
#[derive(Debug, Clone, PartialEq)]
enum PseudoClass {
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(NthExpression),
    NthLastChild(NthExpression),
    NthOfType(NthExpression),
    NthLastOfType(NthExpression),
    Checked,
    Disabled,
    Not(SelectorList),
    Is(SelectorList),
}

/// An+B expression for :nth-* selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthExpression {
    /// Coefficient (A in An+B)
    pub a: i32,
    /// Offset (B in An+B)
    pub b: i32,
}

impl NthExpression {
    /// Create "odd" expression (2n+1)
    pub fn odd() -> Self {
        Self { a: 2, b: 1 }
    }

    /// Create "even" expression (2n)
    pub fn even() -> Self {
        Self { a: 2, b: 0 }
    }

    /// Create a simple index (0n+b)
    pub fn index(n: i32) -> Self {
        Self { a: 0, b: n }
    }

    /// Create An+B expression
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse from string like "2n+1", "odd", "even", "3"
    pub fn parse(s: &str) -> Option<Self> {
        let s: String = s.split_whitespace().collect::<String>().to_ascii_lowercase();

        match s.as_str() {
            "odd" => return Some(Self::odd()),
            "even" => return Some(Self::even()),
            _ => {}
        }

        if let Ok(n) = s.parse::<i32>() {
            return Some(Self::index(n));
        }

        let n_pos = s.find('n')?;
        let a = match &s[..n_pos] {
            "" | "+" => 1,
            "-" => -1,
            a_str => a_str.parse().ok()?,
        };
        let rest = &s[n_pos + 1..];
        let b = if rest.is_empty() {
            0
        } else if rest.starts_with('+') || rest.starts_with('-') {
            rest.parse().ok()?
        } else {
            return None;
        };

        Some(Self::new(a, b))
    }

    /// Check if index n (1-based) matches this expression
    pub fn matches(&self, n: i32) -> bool {
        if self.a == 0 {
            return n == self.b;
        }

        let diff = n - self.b;
        if self.a > 0 {
            diff >= 0 && diff % self.a == 0
        } else {
            diff <= 0 && diff % self.a == 0
        }
    }
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(text: &str) -> DomResult<Self> {
        let mut parser = Parser::new(text);
        let list = parser.parse_list()?;
        if !parser.at_end() {
            return Err(parser.error());
        }
        Ok(list)
    }

    /// Source text this list was parsed from
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether any selector in the list matches the element
    ///
    /// Non-element nodes never match.
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        tree.element(id).is_some() && self.selectors.iter().any(|s| s.matches(tree, id))
    }
}

impl FromStr for SelectorList {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl ComplexSelector {
    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.matches_from(tree, id, self.parts.len() - 1)
    }

    /// Right-to-left match with backtracking over ancestors and siblings
    fn matches_from(&self, tree: &DomTree, id: NodeId, idx: usize) -> bool {
        let part = &self.parts[idx];
        if !part.compound.matches(tree, id) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        match part.combinator.unwrap_or(Combinator::Descendant) {
            Combinator::Child => tree
                .parent_element(id)
                .is_some_and(|p| self.matches_from(tree, p, idx - 1)),
            Combinator::Descendant => tree
                .ancestors(id)
                .filter(|&a| tree.element(a).is_some())
                .any(|a| self.matches_from(tree, a, idx - 1)),
            Combinator::NextSibling => previous_element_sibling(tree, id)
                .is_some_and(|s| self.matches_from(tree, s, idx - 1)),
            Combinator::SubsequentSibling => {
                std::iter::successors(previous_element_sibling(tree, id), |&s| {
                    previous_element_sibling(tree, s)
                })
                .any(|s| self.matches_from(tree, s, idx - 1))
            }
        }
    }
}

impl CompoundSelector {
    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(elem) = tree.element(id) else {
            return false;
        };

        if let Some(tag) = &self.tag {
            if !elem.local_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if !self.ids.iter().all(|want| elem.id() == Some(want.as_str())) {
            return false;
        }
        if !self.classes.iter().all(|c| elem.has_class(c)) {
            return false;
        }
        if !self.attrs.iter().all(|a| a.matches(elem.get_attr(&a.name))) {
            return false;
        }
        self.pseudo_classes.iter().all(|p| p.matches(tree, id))
    }
}

impl PseudoClass {
    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        match self {
            Self::Root => tree.parent(id) == Some(NodeId::ROOT),
            Self::Empty => tree.children(id).all(|(_, n)| {
                !n.is_element() && n.as_text().is_none_or(str::is_empty)
            }),
            Self::FirstChild => previous_element_sibling(tree, id).is_none(),
            Self::LastChild => next_element_sibling(tree, id).is_none(),
            Self::OnlyChild => {
                previous_element_sibling(tree, id).is_none()
                    && next_element_sibling(tree, id).is_none()
            }
            Self::FirstOfType => sibling_position(tree, id, true).0 == 1,
            Self::LastOfType => {
                let (index, count) = sibling_position(tree, id, true);
                index == count
            }
            Self::OnlyOfType => sibling_position(tree, id, true).1 == 1,
            Self::NthChild(expr) => expr.matches(sibling_position(tree, id, false).0 as i32),
            Self::NthLastChild(expr) => {
                let (index, count) = sibling_position(tree, id, false);
                expr.matches((count - index + 1) as i32)
            }
            Self::NthOfType(expr) => expr.matches(sibling_position(tree, id, true).0 as i32),
            Self::NthLastOfType(expr) => {
                let (index, count) = sibling_position(tree, id, true);
                expr.matches((count - index + 1) as i32)
            }
            Self::Checked => tree.element(id).is_some_and(|e| e.has_attr("checked")),
            Self::Disabled => tree.element(id).is_some_and(|e| e.has_attr("disabled")),
            Self::Not(list) => !list.matches(tree, id),
            Self::Is(list) => list.matches(tree, id),
        }
    }
}

fn previous_element_sibling(tree: &DomTree, id: NodeId) -> Option<NodeId> {
    let mut cursor = tree.get(id)?.prev_sibling;
    while cursor.is_valid() {
        let node = tree.get(cursor)?;
        if node.is_element() {
            return Some(cursor);
        }
        cursor = node.prev_sibling;
    }
    None
}

fn next_element_sibling(tree: &DomTree, id: NodeId) -> Option<NodeId> {
    let mut cursor = tree.get(id)?.next_sibling;
    while cursor.is_valid() {
        let node = tree.get(cursor)?;
        if node.is_element() {
            return Some(cursor);
        }
        cursor = node.next_sibling;
    }
    None
}

/// 1-based index of `id` among its element siblings and the sibling count,
/// optionally restricted to siblings with the same local name
fn sibling_position(tree: &DomTree, id: NodeId, same_type: bool) -> (usize, usize) {
    let Some(parent) = tree.parent(id) else {
        return (1, 1);
    };
    let name = tree.element(id).map(|e| e.local_name.as_str()).unwrap_or("");

    let mut index = 0;
    let mut count = 0;
    for sibling in tree.element_children(parent) {
        if same_type && tree.element(sibling).is_some_and(|e| e.local_name != name) {
            continue;
        }
        count += 1;
        if sibling == id {
            index = count;
        }
    }
    (index, count)
}

/// Recursive-descent selector parser
struct Parser<'a> {
    text: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self) -> DomError {
        DomError::InvalidSelector(self.text.to_string())
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> DomResult<()> {
        if self.eat(c) { Ok(()) } else { Err(self.error()) }
    }

    /// Skip whitespace, reporting whether any was skipped
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse_list(&mut self) -> DomResult<SelectorList> {
        let start = self.pos;
        let mut selectors = Vec::new();
        loop {
            self.skip_ws();
            selectors.push(self.parse_complex()?);
            self.skip_ws();
            if !self.eat(',') {
                break;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        Ok(SelectorList {
            text: text.trim().to_string(),
            selectors,
        })
    }

    fn parse_complex(&mut self) -> DomResult<ComplexSelector> {
        let mut parts = vec![SelectorPart {
            compound: self.parse_compound()?,
            combinator: None,
        }];

        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_ws => Combinator::Descendant,
                Some(_) => return Err(self.error()),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_ws();
            }
            parts.push(SelectorPart {
                compound: self.parse_compound()?,
                combinator: Some(combinator),
            });
        }

        Ok(ComplexSelector { parts })
    }

    fn parse_compound(&mut self) -> DomResult<CompoundSelector> {
        let mut compound = CompoundSelector::default();

        if self.eat('*') {
            compound.universal = true;
        } else if self.peek().is_some_and(is_ident_start) {
            compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    let id = self.parse_ident()?;
                    compound.ids.push(id);
                }
                Some('.') => {
                    self.pos += 1;
                    let class = self.parse_ident()?;
                    compound.classes.push(class);
                }
                Some('[') => {
                    let attr = self.parse_attribute()?;
                    compound.attrs.push(attr);
                }
                Some(':') => {
                    let pseudo = self.parse_pseudo()?;
                    compound.pseudo_classes.push(pseudo);
                }
                _ => break,
            }
        }

        if compound.is_empty() {
            return Err(self.error());
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> DomResult<String> {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                let escaped = self.peek().ok_or_else(|| self.error())?;
                ident.push(escaped);
                self.pos += 1;
            } else if is_ident_char(c) {
                ident.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }

        let first = ident.chars().next().ok_or_else(|| self.error())?;
        let second = ident.chars().nth(1);
        if first.is_ascii_digit()
            || (first == '-' && second.is_some_and(|c| c.is_ascii_digit()))
            || ident == "-"
        {
            return Err(self.error());
        }
        Ok(ident)
    }

    fn parse_attribute(&mut self) -> DomResult<AttributeSelector> {
        self.expect('[')?;
        self.skip_ws();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_ws();

        if self.eat(']') {
            return Ok(AttributeSelector {
                name,
                matcher: None,
                case_insensitive: false,
            });
        }

        let op = match self.peek() {
            Some('=') => None,
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                self.pos += 1;
                Some(c)
            }
            _ => return Err(self.error()),
        };
        self.expect('=')?;
        self.skip_ws();

        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    match self.peek() {
                        None => return Err(self.error()),
                        Some(c) if c == q => {
                            self.pos += 1;
                            break;
                        }
                        Some('\\') => {
                            self.pos += 1;
                            value.push(self.peek().ok_or_else(|| self.error())?);
                            self.pos += 1;
                        }
                        Some(c) => {
                            value.push(c);
                            self.pos += 1;
                        }
                    }
                }
                value
            }
            _ => self.parse_ident()?,
        };
        self.skip_ws();

        let mut case_insensitive = false;
        if matches!(self.peek(), Some('i' | 'I')) {
            case_insensitive = true;
            self.pos += 1;
            self.skip_ws();
        } else if matches!(self.peek(), Some('s' | 'S')) {
            self.pos += 1;
            self.skip_ws();
        }
        self.expect(']')?;

        let matcher = match op {
            None => AttributeMatcher::Exact(value),
            Some('~') => AttributeMatcher::Includes(value),
            Some('|') => AttributeMatcher::DashMatch(value),
            Some('^') => AttributeMatcher::Prefix(value),
            Some('$') => AttributeMatcher::Suffix(value),
            Some(_) => AttributeMatcher::Substring(value),
        };

        Ok(AttributeSelector {
            name,
            matcher: Some(matcher),
            case_insensitive,
        })
    }

    fn parse_pseudo(&mut self) -> DomResult<PseudoClass> {
        self.expect(':')?;
        // Pseudo-elements never match an element.
        if self.peek() == Some(':') {
            return Err(self.error());
        }
        let name = self.parse_ident()?.to_ascii_lowercase();

        if !self.eat('(') {
            return match name.as_str() {
                "root" => Ok(PseudoClass::Root),
                "empty" => Ok(PseudoClass::Empty),
                "first-child" => Ok(PseudoClass::FirstChild),
                "last-child" => Ok(PseudoClass::LastChild),
                "only-child" => Ok(PseudoClass::OnlyChild),
                "first-of-type" => Ok(PseudoClass::FirstOfType),
                "last-of-type" => Ok(PseudoClass::LastOfType),
                "only-of-type" => Ok(PseudoClass::OnlyOfType),
                "checked" => Ok(PseudoClass::Checked),
                "disabled" => Ok(PseudoClass::Disabled),
                _ => Err(self.error()),
            };
        }

        let pseudo = match name.as_str() {
            "not" | "is" | "where" => {
                let list = self.parse_list()?;
                if name == "not" {
                    PseudoClass::Not(list)
                } else {
                    PseudoClass::Is(list)
                }
            }
            "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c != ')') {
                    self.pos += 1;
                }
                let arg: String = self.chars[start..self.pos].iter().collect();
                let expr = NthExpression::parse(&arg).ok_or_else(|| self.error())?;
                match name.as_str() {
                    "nth-child" => PseudoClass::NthChild(expr),
                    "nth-last-child" => PseudoClass::NthLastChild(expr),
                    "nth-of-type" => PseudoClass::NthOfType(expr),
                    _ => PseudoClass::NthLastOfType(expr),
                }
            }
            _ => return Err(self.error()),
        };

        self.skip_ws();
        self.expect(')')?;
        Ok(pseudo)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}
