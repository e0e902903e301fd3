//! Greedy line wrapping over per-character advances

/// One wrapped line: the byte range of its text and its advance width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrappedLine {
    pub start: usize,
    pub end: usize,
    pub width: f32,
}

#[derive(Clone, Copy)]
struct Glyph {
    index: usize,
    c: char,
    advance: f32,
}

/// Break `text` into lines no wider than `max_width`.
///
/// Lines break after the last whitespace that fits, or mid-word when a
/// single word is wider than the line. `'\n'` always breaks. Whitespace never
/// forces a break; it hangs at the end of the line and does not count toward
/// the width. Whitespace at the start of a wrapped line is dropped.
pub fn wrap_lines(
    text: &str,
    max_width: f32,
    mut advance: impl FnMut(char) -> f32,
) -> Vec<WrappedLine> {
    let mut lines = Vec::new();
    let mut current: Vec<Glyph> = Vec::new();
    let mut line_start = 0;
    let mut line_width = 0.0f32;
    // Glyph count up to and including the last whitespace on the line
    let mut last_word_end = 0;
    let mut wrapped = false;

    for (index, c) in text.char_indices() {
        if c == '\n' {
            lines.push(finish_line(&current, line_start));
            current.clear();
            line_start = index + c.len_utf8();
            line_width = 0.0;
            last_word_end = 0;
            wrapped = false;
            continue;
        }

        let glyph = Glyph {
            index,
            c,
            advance: advance(c),
        };

        if !c.is_whitespace() && line_width + glyph.advance > max_width && !current.is_empty() {
            // Without a word boundary the break falls at the current character
            let remaining = if last_word_end > 0 {
                current.split_off(last_word_end)
            } else {
                Vec::new()
            };
            lines.push(finish_line(&current, line_start));

            current = remaining
                .into_iter()
                .skip_while(|g| g.c.is_whitespace())
                .collect();
            line_start = current.first().map_or(index, |g| g.index);
            line_width = current.iter().map(|g| g.advance).sum();
            last_word_end = 0;
            wrapped = true;
        }

        if c.is_whitespace() && current.is_empty() && wrapped {
            line_start = index + c.len_utf8();
            continue;
        }

        current.push(glyph);
        line_width += glyph.advance;
        if c.is_whitespace() {
            last_word_end = current.len();
        }
    }

    lines.push(finish_line(&current, line_start));
    lines
}

fn finish_line(glyphs: &[Glyph], line_start: usize) -> WrappedLine {
    let end = glyphs
        .last()
        .map_or(line_start, |g| g.index + g.c.len_utf8());
    let width = glyphs
        .iter()
        .rposition(|g| !g.c.is_whitespace())
        .map_or(0.0, |last_ink| {
            glyphs[..=last_ink].iter().map(|g| g.advance).sum()
        });
    WrappedLine {
        start: line_start,
        end,
        width,
    }
}

/// Snap a length up to whole device pixels at `scale_factor`.
pub fn snap_to_device(v: f32, scale_factor: f32) -> f32 {
    let sf = if scale_factor.is_finite() && scale_factor > 0.0 {
        scale_factor
    } else {
        1.0
    };
    // Absorb float noise so exact pixel multiples do not grow
    ((v * sf - 1e-3).ceil() / sf).max(0.0)
}
