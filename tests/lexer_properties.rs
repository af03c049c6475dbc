// Generated-input checks for the classc lexer.
//
// Each test states one invariant and lets proptest search for a
// counterexample: scanning never panics, floats stay whole, the keyword
// table is exact, and re-scanning the lexemes reproduces the kinds.

use proptest::prelude::*;

use classc::frontend::lexer::tokenize;
use classc::frontend::token::TokenKind;

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("class", TokenKind::Class),
    ("isa", TokenKind::Isa),
    ("public", TokenKind::Public),
    ("private", TokenKind::Private),
    ("function", TokenKind::Function),
    ("constructor", TokenKind::Constructor),
    ("attribute", TokenKind::Attribute),
    ("integer", TokenKind::Integer),
    ("float", TokenKind::Float),
    ("void", TokenKind::Void),
    ("if", TokenKind::If),
    ("then", TokenKind::Then),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("read", TokenKind::Read),
    ("write", TokenKind::Write),
    ("return", TokenKind::Return),
    ("not", TokenKind::Not),
    ("or", TokenKind::Or),
    ("and", TokenKind::And),
    ("localVar", TokenKind::LocalVar),
    ("sr", TokenKind::Sr),
    ("arrow", TokenKind::Arrow),
    ("type", TokenKind::Type),
];

const SYMBOLS: &[&str] = &[
    "+", "-", "*", "/", "=", ":=", "==", "!=", "<", "<=", ">", ">=", ":", "::", "->", ",",
    ";", "(", ")", "[", "]", "{", "}", ".",
];

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).0.into_iter().map(|t| t.kind).collect()
}

/// Any single lexeme the language accepts
fn lexeme() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(KEYWORDS).prop_map(|(word, _)| word.to_string()),
        prop::sample::select(SYMBOLS).prop_map(str::to_string),
        "[a-zA-Z_][a-zA-Z0-9_]{0,8}",
        "[0-9]{1,12}",
        "[0-9]{1,6}\\.[0-9]{0,6}",
        "\\.[0-9]{1,6}",
    ]
}

// =============================================================================
// Safety
// =============================================================================

/// Arbitrary text never panics and the stream always ends in one `Eof`
#[test]
fn prop_lexer_never_panics() {
    proptest!(|(source in "\\PC{0,500}")| {
        let (tokens, _errors) = tokenize(&source);
        prop_assert_eq!(tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
        prop_assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
    });
}

/// Illegal characters are skipped, never emitted as tokens
#[test]
fn prop_no_unknown_tokens_escape() {
    proptest!(|(source in "\\PC{0,200}")| {
        let (tokens, _errors) = tokenize(&source);
        prop_assert!(tokens.iter().all(|t| !matches!(t.kind, TokenKind::Unknown(_))));
    });
}

// =============================================================================
// Literals and keywords
// =============================================================================

/// `digits.digits` is always one float, never int + dot + int
#[test]
fn prop_float_is_never_split() {
    proptest!(|(source in "[0-9]{1,9}\\.[0-9]{1,9}")| {
        let (tokens, errors) = tokenize(&source);
        prop_assert!(errors.is_empty());
        prop_assert_eq!(tokens.len(), 2);
        prop_assert!(matches!(tokens[0].kind, TokenKind::FloatLit(_)));
        prop_assert_eq!(&tokens[0].lexeme, &source);
    });
}

/// Every reserved spelling maps to its own kind, with or without padding
#[test]
fn prop_keyword_maps_to_its_kind() {
    proptest!(|(entry in prop::sample::select(KEYWORDS), pad in "[ \t\n]{0,3}")| {
        let (word, kind) = entry;
        prop_assert_eq!(TokenKind::keyword_from_str(word), Some(kind.clone()));
        prop_assert_eq!(kinds(&format!("{}{}{}", pad, word, pad)), vec![kind, TokenKind::Eof]);
    });
}

/// An identifier that is not reserved stays an identifier
#[test]
fn prop_plain_identifier_is_ident() {
    proptest!(|(name in "[a-z_][a-zA-Z0-9_]{0,10}")| {
        prop_assume!(KEYWORDS.iter().all(|(word, _)| *word != name));
        prop_assert_eq!(kinds(&name), vec![TokenKind::Ident(name.clone()), TokenKind::Eof]);
    });
}

// =============================================================================
// Round trips
// =============================================================================

/// Joining the lexemes with spaces and scanning again gives the same kinds
#[test]
fn prop_retokenizing_lexemes_is_idempotent() {
    proptest!(|(words in prop::collection::vec(lexeme(), 0..40))| {
        let source = words.join(" ");
        let (first, _) = tokenize(&source);

        let lexemes: Vec<String> = first
            .iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| t.lexeme.clone())
            .collect();
        let (second, _) = tokenize(&lexemes.join(" "));

        let first_kinds: Vec<_> = first.into_iter().map(|t| t.kind).collect();
        let second_kinds: Vec<_> = second.into_iter().map(|t| t.kind).collect();
        prop_assert_eq!(first_kinds, second_kinds);
    });
}

/// Spans point back at the lexeme in the source
#[test]
fn prop_span_covers_lexeme() {
    proptest!(|(words in prop::collection::vec(lexeme(), 1..20))| {
        let source = words.join(" ");
        let chars: Vec<char> = source.chars().collect();
        let (tokens, _) = tokenize(&source);

        for token in tokens.iter().filter(|t| t.kind != TokenKind::Eof) {
            let text: String = chars[token.span.start..token.span.end].iter().collect();
            prop_assert_eq!(&text, &token.lexeme);
        }
    });
}
