use nom::error::Error;

const SNIPPET_CHARS: usize = 24;

pub fn syntax_error_detail(err: nom::Err<Error<&str>>) -> String {
    match err {
        nom::Err::Incomplete(_) => "Unexpected end of line".to_string(),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            if e.input.trim().is_empty() {
                "Unexpected end of line".to_string()
            } else {
                format!("Unexpected input near '{}'", snippet(e.input))
            }
        }
    }
}

pub fn unparsed_input_detail(rest: &str) -> String {
    format!("Unparsed input: {}", snippet(rest))
}

fn snippet(input: &str) -> &str {
    let input = input.trim();
    match input.char_indices().nth(SNIPPET_CHARS) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}
