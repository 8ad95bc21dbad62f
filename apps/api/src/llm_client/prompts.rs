// Shared prompt fragments.
// Each workflow module keeps its own prompts.rs alongside it.

/// Instruction appended to prompts whose reply is used verbatim as document text.
pub const PLAIN_TEXT_INSTRUCTION: &str = "\
    Respond with the document text only. \
    Do NOT wrap it in markdown code fences. \
    Do NOT add commentary before or after the document.";

/// Fills `{name}` slots in `template` in one pass over the template text.
///
/// Inserted values are never rescanned, so user text containing `{proposal}`
/// or `{{template}}` is passed through untouched. Unknown slots are left as-is.
pub fn fill_slots(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let filled = slots.iter().find_map(|(name, value)| {
            tail.strip_prefix(name)
                .and_then(|after| after.strip_prefix('}'))
                .map(|after| (*value, after))
        });
        match filled {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}
