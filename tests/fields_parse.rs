use cert_splitter::{config::Fields, fields::parse_fields};

#[test]
fn first_two_non_empty_lines() {
    let cfg = Fields::default();
    let f = parse_fields(&cfg, "\n   \n  A123  \n\n Jane Doe\nextra line\n");
    assert_eq!(f.identifier, "A123");
    assert_eq!(f.name, "Jane Doe");
    assert!(!f.fallback);
}

#[test]
fn zero_or_one_line_uses_sentinels() {
    let cfg = Fields::default();
    for text in ["", "   \n\t\n", "A123", "\n A123 \n   "] {
        let f = parse_fields(&cfg, text);
        assert_eq!(f.identifier, "unknown_cert", "text {text:?}");
        assert_eq!(f.name, "unknown_name", "text {text:?}");
        assert!(f.fallback);
    }
}

#[test]
fn crlf_lines_are_trimmed() {
    let cfg = Fields::default();
    let f = parse_fields(&cfg, "C-77\r\nRavi Kumar\r\n");
    assert_eq!(f.identifier, "C-77");
    assert_eq!(f.name, "Ravi Kumar");
}

#[test]
fn unicode_normalization_is_opt_in() {
    let decomposed = "e\u{0301}";
    let text = format!("X1\nRen{decomposed}\n");

    let cfg = Fields::default();
    assert_eq!(parse_fields(&cfg, &text).name, format!("Ren{decomposed}"));

    let cfg = Fields {
        normalize_unicode: true,
        ..Fields::default()
    };
    assert_eq!(parse_fields(&cfg, &text).name, "Ren\u{00e9}");
}
