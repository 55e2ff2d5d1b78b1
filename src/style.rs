//! Inline style reading for code indentation.
//!
//! Some EPUBs lay out code listings as one `<div>` per line and express the
//! indentation with `padding-left`/`margin-left` in `em`. Extracted code
//! would lose it, so the offsets are turned back into spaces.

use cssparser::{ParseError, Parser, ParserInput, RuleBodyItemParser, RuleBodyParser, Token};

/// Number of spaces standing for `style`'s left offsets.
///
/// Every `padding-left` and `margin-left` declaration expressed in `em`
/// contributes `value * spaces_per_em` spaces, truncated. Other units and
/// properties are ignored.
pub fn indentation_for_style(style: &str, spaces_per_em: f64) -> String {
    let mut offsets = Vec::new();
    let mut input = ParserInput::new(style);
    let mut parser = Parser::new(&mut input);
    let mut decl_parser = LeftOffsetParser {
        offsets: &mut offsets,
    };

    for result in RuleBodyParser::new(&mut parser, &mut decl_parser) {
        // Ignore errors - lenient parsing
        let _ = result;
    }

    let count: usize = offsets
        .iter()
        .map(|em| (f64::from(*em) * spaces_per_em) as usize)
        .sum();
    " ".repeat(count)
}

/// Collects `em` values of left offset declarations.
struct LeftOffsetParser<'a> {
    offsets: &'a mut Vec<f32>,
}

impl<'i> cssparser::AtRuleParser<'i> for LeftOffsetParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();
}

impl<'i> cssparser::QualifiedRuleParser<'i> for LeftOffsetParser<'_> {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = ();
}

impl<'i> cssparser::DeclarationParser<'i> for LeftOffsetParser<'_> {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: cssparser::CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &cssparser::ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        if name.eq_ignore_ascii_case("padding-left") || name.eq_ignore_ascii_case("margin-left") {
            if let Ok(Token::Dimension { value, unit, .. }) = input.next()
                && unit.eq_ignore_ascii_case("em")
                && *value >= 0.0
            {
                self.offsets.push(*value);
            }
        }

        // Consume whatever is left (e.g. `!important`)
        while input.next().is_ok() {}
        Ok(())
    }
}

impl<'i> RuleBodyItemParser<'i, (), ()> for LeftOffsetParser<'_> {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}
