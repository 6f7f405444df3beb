//! Large seven-row digits for the cast timer.

const FONT_HEIGHT: usize = 7;
const SHADOW_OFFSET: usize = 1;
const FILL_CHAR: char = '█';
const SHADOW_CHAR: char = '░';

type Glyph = [&'static str; FONT_HEIGHT];

const DIGITS: [Glyph; 10] = [
    ["0000", "0  0", "0  0", "0  0", "0  0", "0  0", "0000"],
    ["  1 ", " 11 ", "  1 ", "  1 ", "  1 ", "  1 ", " 111"],
    ["2222", "   2", "   2", "2222", "2   ", "2   ", "2222"],
    ["3333", "   3", "   3", " 333", "   3", "   3", "3333"],
    ["4  4", "4  4", "4  4", "4444", "   4", "   4", "   4"],
    ["5555", "5   ", "5   ", "5555", "   5", "   5", "5555"],
    ["6666", "6   ", "6   ", "6666", "6  6", "6  6", "6666"],
    ["7777", "   7", "   7", "  7 ", "  7 ", " 7  ", " 7  "],
    ["8888", "8  8", "8  8", "8888", "8  8", "8  8", "8888"],
    ["9999", "9  9", "9  9", "9999", "   9", "   9", "9999"],
];
const DOT: Glyph = ["  ", "  ", "  ", "  ", "  ", "  ", " ."];
const BLANK: Glyph = ["  ", "  ", "  ", "  ", "  ", "  ", "  "];

fn glyph_for(ch: char) -> &'static Glyph {
    match ch.to_digit(10) {
        Some(digit) => &DIGITS[digit as usize],
        None if ch == '.' => &DOT,
        None => &BLANK,
    }
}

/// Render a timer value such as `12.3` as block digits with a drop shadow.
///
/// Every lit cell of a glyph is two terminal columns wide. Characters other
/// than digits and `.` render as blank space.
pub fn render(text: &str) -> Vec<String> {
    let glyphs: Vec<&Glyph> = text.chars().map(glyph_for).collect();
    let height = FONT_HEIGHT + SHADOW_OFFSET;
    if glyphs.is_empty() {
        return vec![String::new(); height];
    }

    let spacing = 1;
    let width: usize = glyphs
        .iter()
        .map(|glyph| glyph[0].chars().count() * 2 + spacing)
        .sum::<usize>()
        + SHADOW_OFFSET * 2;
    let mut canvas = vec![vec![' '; width]; height];

    let mut x_offset = 0;
    for glyph in glyphs {
        for (y, row) in glyph.iter().enumerate() {
            for (col, symbol) in row.chars().enumerate() {
                if symbol != ' ' {
                    light(&mut canvas, y, x_offset + col * 2);
                }
            }
        }
        x_offset += glyph[0].chars().count() * 2 + spacing;
    }

    canvas
        .into_iter()
        .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
        .collect()
}

fn light(canvas: &mut [Vec<char>], y: usize, x: usize) {
    for dx in 0..2 {
        put(canvas, y + SHADOW_OFFSET, x + SHADOW_OFFSET * 2 + dx, SHADOW_CHAR);
        put(canvas, y, x + dx, FILL_CHAR);
    }
}

fn put(canvas: &mut [Vec<char>], y: usize, x: usize, ch: char) {
    let Some(cell) = canvas.get_mut(y).and_then(|row| row.get_mut(x)) else {
        return;
    };
    if *cell == ' ' || (*cell == SHADOW_CHAR && ch == FILL_CHAR) {
        *cell = ch;
    }
}
