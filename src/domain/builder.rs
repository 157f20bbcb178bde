//! Reference graph builder: turns `name,left,right` lines into a [`ScaleGraph`].

use std::fmt;

use tracing::{debug, instrument, trace};

use crate::domain::arena::ScaleGraph;
use crate::domain::entities::{Hand, Mass, Pan, ScaleId, Side, DEFAULT_SELF_MASS};
use crate::domain::error::DomainResult;

/// Default marker for comment lines (checked on the first character only).
pub const DEFAULT_COMMENT_PREFIX: &str = "#";

/// Classified side token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// No token given; the side is left as it is.
    Empty,
    Weight(Mass),
    Reference(String),
}

/// Why a line was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    EmptyName,
    SelfReference(Hand),
    WeightOverflow(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::EmptyName => write!(f, "missing scale name"),
            RejectReason::SelfReference(Hand::Left) => {
                write!(f, "scale references itself on the left")
            }
            RejectReason::SelfReference(Hand::Right) => {
                write!(f, "scale references itself on the right")
            }
            RejectReason::WeightOverflow(token) => write!(f, "weight too large: {}", token),
        }
    }
}

/// A line that was skipped with a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    /// 0-based index of the physical line
    pub index: usize,
    /// Line text as read
    pub line: String,
    pub reason: RejectReason,
}

impl fmt::Display for RejectedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid line {}: {:?} ({})", self.index, self.line, self.reason)
    }
}

/// What happened to one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank or comment line
    Skipped,
    /// The line defined (or redefined) this scale
    Applied(ScaleId),
    Rejected(RejectedLine),
}

/// ASCII whitespace including vertical tab; other Unicode spaces are kept.
fn is_field_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Splits a record into its three fields with all ASCII whitespace removed.
///
/// Missing fields come back empty, fields past the third are ignored.
pub fn parse_line(line: &str) -> (String, String, String) {
    let mut fields = line
        .split(',')
        .map(|field| {
            field
                .chars()
                .filter(|&c| !is_field_space(c))
                .collect::<String>()
        });
    let name = fields.next().unwrap_or_default();
    let left = fields.next().unwrap_or_default();
    let right = fields.next().unwrap_or_default();
    (name, left, right)
}

/// Classifies a stripped token.
///
/// A leading digit makes it a weight, parsed from its leading run of digits;
/// whatever follows the digits is ignored.
pub fn classify_token(token: &str) -> Result<Token, RejectReason> {
    match token.chars().next() {
        None => Ok(Token::Empty),
        Some(first) if first.is_ascii_digit() => {
            let end = token
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(token.len());
            token[..end]
                .parse::<Mass>()
                .map(Token::Weight)
                .map_err(|_| RejectReason::WeightOverflow(token.to_string()))
        }
        Some(_) => Ok(Token::Reference(token.to_string())),
    }
}

/// Result of a complete build.
#[derive(Debug)]
pub struct BuildOutput {
    pub graph: ScaleGraph,
    pub rejected: Vec<RejectedLine>,
}

/// Incremental builder fed one raw line at a time.
#[derive(Debug)]
pub struct ScaleBuilder {
    graph: ScaleGraph,
    comment_prefix: String,
    next_index: usize,
    rejected: Vec<RejectedLine>,
}

impl Default for ScaleBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SELF_MASS)
    }
}

impl ScaleBuilder {
    pub fn new(self_mass: Mass) -> Self {
        Self {
            graph: ScaleGraph::new(self_mass),
            comment_prefix: DEFAULT_COMMENT_PREFIX.to_string(),
            next_index: 0,
            rejected: Vec::new(),
        }
    }

    /// An empty prefix disables comment detection.
    pub fn with_comment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.comment_prefix = prefix.into();
        self
    }

    fn is_comment(&self, line: &str) -> bool {
        !self.comment_prefix.is_empty() && line.starts_with(&self.comment_prefix)
    }

    /// Applies the next physical line.
    #[instrument(level = "trace", skip(self))]
    pub fn push_line(&mut self, line: &str) -> DomainResult<LineOutcome> {
        let index = self.next_index;
        self.next_index += 1;

        if line.is_empty() || self.is_comment(line) {
            return Ok(LineOutcome::Skipped);
        }

        let (name, left, right) = parse_line(line);
        let tokens = validate(&name, &left, &right)
            .and_then(|()| Ok((classify_token(&left)?, classify_token(&right)?)));
        let (left, right) = match tokens {
            Ok(tokens) => tokens,
            Err(reason) => {
                let rejected = RejectedLine {
                    index,
                    line: line.to_string(),
                    reason,
                };
                debug!("{}", rejected);
                self.rejected.push(rejected.clone());
                return Ok(LineOutcome::Rejected(rejected));
            }
        };

        let id = self.graph.get_or_create(&name);
        self.assign_side(id, Hand::Left, left)?;
        self.assign_side(id, Hand::Right, right)?;
        trace!("line {}: defined scale {}", index, name);
        Ok(LineOutcome::Applied(id))
    }

    fn assign_side(&mut self, owner: ScaleId, hand: Hand, token: Token) -> DomainResult<()> {
        let side = match token {
            Token::Empty => return Ok(()),
            Token::Weight(mass) => Side::Pan(Pan::new(mass)),
            Token::Reference(name) => Side::Reference(self.graph.get_or_create(&name)),
        };
        self.graph.set_side(owner, hand, side)
    }

    /// Number of lines consumed so far, including skipped ones.
    pub fn lines_read(&self) -> usize {
        self.next_index
    }

    pub fn rejected(&self) -> &[RejectedLine] {
        &self.rejected
    }

    pub fn finish(self) -> BuildOutput {
        debug!(
            "built {} scales, rejected {} lines",
            self.graph.len(),
            self.rejected.len()
        );
        BuildOutput {
            graph: self.graph,
            rejected: self.rejected,
        }
    }

    /// Feeds every line and finishes.
    pub fn build<I, S>(mut self, lines: I) -> DomainResult<BuildOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.push_line(line.as_ref())?;
        }
        Ok(self.finish())
    }
}

fn validate(name: &str, left: &str, right: &str) -> Result<(), RejectReason> {
    if name.is_empty() {
        Err(RejectReason::EmptyName)
    } else if left == name {
        Err(RejectReason::SelfReference(Hand::Left))
    } else if right == name {
        Err(RejectReason::SelfReference(Hand::Right))
    } else {
        Ok(())
    }
}

/// Builds a graph from `text` with default settings.
pub fn parse_scales(text: &str) -> DomainResult<BuildOutput> {
    ScaleBuilder::default().build(text.lines())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn names(output: &BuildOutput) -> Vec<&str> {
        output
            .graph
            .iter()
            .map(|(_, scale)| scale.name.as_str())
            .collect()
    }

    #[test]
    fn given_padded_line_when_parsing_then_strips_whitespace() {
        let (name, left, right) = parse_line("  Scale1 , 3 , Scale2  ");
        assert_eq!(name, "Scale1");
        assert_eq!(left, "3");
        assert_eq!(right, "Scale2");
    }

    #[test]
    fn given_internal_whitespace_when_parsing_then_removes_it() {
        let (name, left, right) = parse_line("Big Scale,1 2,\tOther One");
        assert_eq!(name, "BigScale");
        assert_eq!(left, "12");
        assert_eq!(right, "OtherOne");
    }

    #[test]
    fn given_non_ascii_space_when_parsing_then_kept_in_field() {
        let (name, left, right) = parse_line("Big\u{00A0}Scale,\x0B1,2\x0C");
        assert_eq!(name, "Big\u{00A0}Scale");
        assert_eq!(left, "1");
        assert_eq!(right, "2");
    }

    #[test]
    fn given_short_line_when_parsing_then_missing_fields_are_empty() {
        assert_eq!(
            parse_line("A,1"),
            ("A".to_string(), "1".to_string(), String::new())
        );
        assert_eq!(
            parse_line("A,1,2,extra"),
            ("A".to_string(), "1".to_string(), "2".to_string())
        );
    }

    #[rstest]
    #[case("", Token::Empty)]
    #[case("42", Token::Weight(42))]
    #[case("7kg", Token::Weight(7))]
    #[case("B", Token::Reference("B".into()))]
    #[case("x9", Token::Reference("x9".into()))]
    fn given_token_when_classifying_then_matches(#[case] token: &str, #[case] expected: Token) {
        assert_eq!(classify_token(token).unwrap(), expected);
    }

    #[test]
    fn given_huge_weight_when_classifying_then_rejects() {
        let token = "99999999999999999999999";
        assert_eq!(
            classify_token(token),
            Err(RejectReason::WeightOverflow(token.to_string()))
        );
    }

    #[test]
    fn given_two_lines_when_building_then_keeps_mention_order() {
        let output = parse_scales("A,2,B\nB,1,3\n").unwrap();
        assert_eq!(names(&output), vec!["A", "B"]);

        let a = output.graph.by_name("A").unwrap();
        assert_eq!(a.left, Side::Pan(Pan::new(2)));
        assert_eq!(a.right, Side::Reference(output.graph.find("B").unwrap()));
    }

    #[test]
    fn given_blank_and_comment_lines_when_building_then_creates_nothing() {
        let output = parse_scales("\n# This is a comment\n\n").unwrap();
        assert!(output.graph.is_empty());
        assert!(output.rejected.is_empty());
    }

    #[test]
    fn given_self_reference_when_building_then_rejects_line() {
        let output = parse_scales("X,X,2\nY,3,Y\n").unwrap();
        assert!(output.graph.is_empty());
        assert_eq!(output.rejected.len(), 2);
        assert_eq!(output.rejected[0].index, 0);
        assert_eq!(output.rejected[0].reason, RejectReason::SelfReference(Hand::Left));
        assert_eq!(output.rejected[1].index, 1);
        assert_eq!(output.rejected[1].reason, RejectReason::SelfReference(Hand::Right));
    }

    #[test]
    fn given_rejected_line_when_displayed_then_names_index_and_text() {
        let output = parse_scales("# header\nInvalid,,Invalid\n").unwrap();
        assert_eq!(output.rejected.len(), 1);
        let message = output.rejected[0].to_string();
        assert!(message.starts_with("Invalid line 1: \"Invalid,,Invalid\""));
    }

    #[test]
    fn given_empty_name_when_building_then_rejects_line() {
        let output = parse_scales(",1,2\n   \n").unwrap();
        assert!(output.graph.is_empty());
        assert_eq!(output.rejected.len(), 2);
        assert!(output
            .rejected
            .iter()
            .all(|r| r.reason == RejectReason::EmptyName));
    }

    #[test]
    fn given_redefinition_when_building_then_last_wins_and_order_is_kept() {
        let output = parse_scales("P,Q,1\nQ,2,2\nP,5,6\n").unwrap();
        assert_eq!(names(&output), vec!["P", "Q"]);

        let p = output.graph.by_name("P").unwrap();
        assert_eq!(p.left, Side::Pan(Pan::new(5)));
        assert_eq!(p.right, Side::Pan(Pan::new(6)));
    }

    #[test]
    fn given_empty_token_on_redefinition_when_building_then_side_is_kept() {
        let output = parse_scales("P,1,2\nP,,7\n").unwrap();
        let p = output.graph.by_name("P").unwrap();
        assert_eq!(p.left, Side::Pan(Pan::new(1)));
        assert_eq!(p.right, Side::Pan(Pan::new(7)));
    }

    #[test]
    fn given_reference_before_definition_when_building_then_position_is_first_mention() {
        let output = parse_scales("Top,Mid,Low\nLow,1,1\nMid,2,3\n").unwrap();
        assert_eq!(names(&output), vec!["Top", "Mid", "Low"]);
    }

    #[test]
    fn given_custom_comment_prefix_when_building_then_hash_is_a_name() {
        let output = ScaleBuilder::default()
            .with_comment_prefix("//")
            .build(["// note", "#A,1,2"])
            .unwrap();
        assert_eq!(names(&output), vec!["#A"]);
    }

    #[test]
    fn given_lines_when_pushing_then_reports_outcomes() {
        let mut builder = ScaleBuilder::default();
        assert_eq!(builder.push_line("").unwrap(), LineOutcome::Skipped);
        assert!(matches!(
            builder.push_line("A,1,2").unwrap(),
            LineOutcome::Applied(_)
        ));
        assert!(matches!(
            builder.push_line("A,A,2").unwrap(),
            LineOutcome::Rejected(_)
        ));
        assert_eq!(builder.lines_read(), 3);
        assert_eq!(builder.rejected().len(), 1);
    }
}
