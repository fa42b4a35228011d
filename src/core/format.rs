/// Replaces each `{key}` in `template` with its value. Placeholders without a
/// matching key are left as they are.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match values.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_known_placeholders() {
        let line = render(
            "[D] {username}: {message}",
            &[("username", "Alex"), ("message", "hi {there}")],
        );
        assert_eq!(line, "[D] Alex: hi {there}");
    }

    #[test]
    fn test_render_leaves_unknown_and_unclosed() {
        assert_eq!(render("{uuid}/{size}", &[("uuid", "abc")]), "abc/{size}");
        assert_eq!(render("open {brace", &[]), "open {brace");
        assert_eq!(render("{username}{username}", &[("username", "x")]), "xx");
    }
}
