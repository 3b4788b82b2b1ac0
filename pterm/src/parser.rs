use pterm_types::ArgError;

/// Split a command line into tokens.
///
/// Tokens are separated by whitespace. A double-quoted segment belongs to
/// the surrounding token and keeps its whitespace; the quotes themselves are
/// removed, so `""` is an empty token.
pub fn tokenize(input: &str) -> Result<Vec<String>, ArgError> {
    let mut tokens = Vec::new();
    let mut current_token = String::new();
    let mut in_token = false;
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            ch if ch.is_whitespace() && !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current_token));
                    in_token = false;
                }
            }
            _ => {
                current_token.push(ch);
                in_token = true;
            }
        }
    }

    if in_quotes {
        return Err(ArgError::UnterminatedQuote);
    }
    if in_token {
        tokens.push(current_token);
    }

    Ok(tokens)
}
