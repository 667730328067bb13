//! Lexer for markup documents using logos
//!
//! Tags are lexed as single tokens (the attribute text is split off by the
//! reader); text runs, comments, and close tags each get their own token.

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    /// `<!-- ... -->` with the delimiters stripped
    #[regex(r"<!--([^-]|-[^-]|--[^>])*-->", |lex| {
        let slice = lex.slice();
        slice[4..slice.len() - 3].to_string()
    }, priority = 6)]
    Comment(String),

    /// `<!DOCTYPE ...>` and other declarations are dropped
    #[regex(r"<![^>]*>", logos::skip, priority = 2)]
    Declaration,

    /// `</name>` carrying the tag name
    #[regex(r"</[A-Za-z][A-Za-z0-9_:.-]*[ \t\n\r]*>", |lex| {
        let slice = lex.slice();
        slice[2..slice.len() - 1].trim().to_string()
    })]
    CloseTag(String),

    /// `<name ...>` or `<name ... />`, raw including the angle brackets
    #[regex(r#"<[A-Za-z][A-Za-z0-9_:.-]*([^<>"']|"[^"]*"|'[^']*')*>"#, |lex| lex.slice().to_string())]
    Tag(String),

    /// Run of character data between tags
    #[regex(r"[^<]+", |lex| lex.slice().to_string())]
    Text(String),
}

/// Lex input into tokens with spans; malformed stretches surface as `Err`.
pub fn lex(input: &str) -> impl Iterator<Item = (Result<Token, ()>, Span)> + '_ {
    Token::lexer(input).spanned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input).map(|(token, _)| token.expect("should lex")).collect()
    }

    #[test]
    fn test_open_and_close_tags() {
        assert_eq!(
            tokens("<div></div>"),
            vec![
                Token::Tag("<div>".to_string()),
                Token::CloseTag("div".to_string()),
            ]
        );
    }

    #[test]
    fn test_standalone_tag() {
        assert_eq!(tokens("<br />"), vec![Token::Tag("<br />".to_string())]);
    }

    #[test]
    fn test_namespaced_tag_names() {
        assert_eq!(
            tokens("<pl:alert></pl:alert>"),
            vec![
                Token::Tag("<pl:alert>".to_string()),
                Token::CloseTag("pl:alert".to_string()),
            ]
        );
    }

    #[test]
    fn test_text_between_tags() {
        assert_eq!(
            tokens("<i>hello</i>"),
            vec![
                Token::Tag("<i>".to_string()),
                Token::Text("hello".to_string()),
                Token::CloseTag("i".to_string()),
            ]
        );
    }

    #[test]
    fn test_attributes_stay_inside_the_tag_token() {
        assert_eq!(
            tokens(r#"<a href="x.html" class='big'>"#),
            vec![Token::Tag(r#"<a href="x.html" class='big'>"#.to_string())]
        );
    }

    #[test]
    fn test_quoted_angle_bracket_does_not_end_the_tag() {
        assert_eq!(
            tokens(r#"<i title="a > b">"#),
            vec![Token::Tag(r#"<i title="a > b">"#.to_string())]
        );
    }

    #[test]
    fn test_comment_interior_extracted() {
        assert_eq!(
            tokens("<!-- a - b -->"),
            vec![Token::Comment(" a - b ".to_string())]
        );
    }

    #[test]
    fn test_doctype_skipped() {
        assert_eq!(
            tokens("<!DOCTYPE html><p>"),
            vec![Token::Tag("<p>".to_string())]
        );
    }

    #[test]
    fn test_close_tag_with_trailing_whitespace() {
        assert_eq!(tokens("</div >"), vec![Token::CloseTag("div".to_string())]);
    }

    #[test]
    fn test_stray_angle_bracket_is_an_error() {
        let results: Vec<_> = lex("< oops").map(|(token, _)| token).collect();
        assert!(results[0].is_err());
    }
}
