use owo_colors::OwoColorize;

/// Text helpers that stay on char boundaries
pub struct TextUtils;

impl TextUtils
{
    /// At most `max_chars` leading characters of `s`
    pub fn preview(
        s: &str,
        max_chars: usize,
    ) -> &str
    {
        match s.char_indices().nth(max_chars)
        {
            Some((byte, _)) => &s[..byte],
            None => s,
        }
    }

    /// Single-line preview with an ellipsis when cut
    pub fn one_line(
        s: &str,
        max_chars: usize,
    ) -> String
    {
        let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
        let cut = Self::preview(&flat, max_chars);

        if cut.len() < flat.len() { format!("{cut}...") } else { flat }
    }
}

/// Colored terminal labels honoring `--no-color`
pub struct Paint;

impl Paint
{
    pub fn score(
        value: f64,
        no_color: bool,
    ) -> String
    {
        let text = format!("{value:.4}");
        if no_color
        {
            return text;
        }

        if value >= 0.7
        {
            text.green().to_string()
        }
        else if value >= 0.4
        {
            text.yellow().to_string()
        }
        else
        {
            text.red().to_string()
        }
    }

    pub fn verdict(
        ok: bool,
        yes: &str,
        no: &str,
        no_color: bool,
    ) -> String
    {
        match (ok, no_color)
        {
            (true, true) => yes.to_string(),
            (false, true) => no.to_string(),
            (true, false) => yes.green().to_string(),
            (false, false) => no.red().to_string(),
        }
    }

    pub fn label(
        s: &str,
        no_color: bool,
    ) -> String
    {
        if no_color { s.to_string() } else { s.bold().to_string() }
    }
}
