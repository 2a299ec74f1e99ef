//! HTML playback page for a stored synthesis.

use crate::pipeline::SynthesisRecord;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{voiceName}}</title>
</head>
<body>
  <h1>{{voiceName}}</h1>
  <p class="native">{{textNative}}</p>
  <p class="translated">{{textTranslated}}</p>
  <audio controls src="{{audioUrl}}"></audio>
</body>
</html>
"#;

pub fn render(record: &SynthesisRecord) -> String {
    let mut out = String::with_capacity(TEMPLATE.len());
    let mut rest = TEMPLATE;

    // Single pass, so inserted text is never treated as a placeholder.
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        out.push_str(&escape(field(record, &after[..end])));
        rest = &after[end + 2..];
    }
    out.push_str(rest);

    out
}

fn field<'a>(record: &'a SynthesisRecord, name: &str) -> &'a str {
    match name {
        "voiceName" => &record.voice_name,
        "textNative" => &record.text_native,
        "textTranslated" => record.text_translated.as_deref().unwrap_or(""),
        "audioUrl" => &record.url,
        _ => "",
    }
}

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
