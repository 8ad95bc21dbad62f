//! Static Helvetica metrics and greedy word-wrap for the PDF exporter.
//!
//! Widths are the standard Type 1 Helvetica AFM advances in 1/1000 em.
//! The table covers ASCII 0x20..=0x7E (95 printable characters);
//! index = (byte as usize) - 32. Anything else uses `AVERAGE_WIDTH`.

/// Width slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, // sp ! " # $ % & '
    333, 333, 389, 584, 278, 333, 278, 278, // ( ) * + , - . /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // : ; < = > ? @
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    278, 278, 278, 469, 556, 333, // [ \ ] ^ _ `
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
    334, 260, 334, 584, // { | } ~
];

/// Fallback advance for bytes outside the ASCII table (WinAnsi accents, quotes).
const AVERAGE_WIDTH: u16 = 556;

/// Measures a WinAnsi-encoded string in points at `font_size`.
pub fn measure(encoded: &[u8], font_size: f32) -> f32 {
    let units: u32 = encoded
        .iter()
        .map(|&b| {
            let code = b as usize;
            if (32..=126).contains(&code) {
                HELVETICA_WIDTHS[code - 32] as u32
            } else {
                AVERAGE_WIDTH as u32
            }
        })
        .sum();
    units as f32 * font_size / 1000.0
}

/// Greedily wraps one line of WinAnsi text into pieces no wider than `max_width` points.
///
/// Words longer than a full line are hard-split. Leading indentation on the first
/// piece is preserved; an empty input yields a single empty line so blank lines survive.
pub fn wrap_line(encoded: &[u8], font_size: f32, max_width: f32) -> Vec<Vec<u8>> {
    if measure(encoded, font_size) <= max_width {
        return vec![encoded.to_vec()];
    }

    let indent_len = encoded.iter().take_while(|&&b| b == b' ').count();
    let (indent, rest) = encoded.split_at(indent_len);
    let space_width = measure(b" ", font_size);

    let mut lines: Vec<Vec<u8>> = Vec::new();
    let mut current: Vec<u8> = indent.to_vec();
    let mut current_width = measure(indent, font_size);
    let mut has_word = false;

    for word in rest.split(|&b| b == b' ').filter(|w| !w.is_empty()) {
        let word_width = measure(word, font_size);
        let needed = if has_word { space_width + word_width } else { word_width };

        if current_width + needed <= max_width {
            if has_word {
                current.push(b' ');
            }
            current.extend_from_slice(word);
            current_width += needed;
            has_word = true;
            continue;
        }

        if has_word {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }

        if word_width <= max_width - current_width {
            current.extend_from_slice(word);
            current_width += word_width;
            has_word = true;
            continue;
        }

        // Hard-split a word that cannot fit on any line.
        for &b in word {
            let w = measure(&[b], font_size);
            if current_width + w > max_width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            current.push(b);
            current_width += w;
        }
        has_word = true;
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Encodes text for a WinAnsi Type 1 font. Tabs become four spaces;
/// other control characters are dropped and unmappable characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' => out.extend_from_slice(b"    "),
            c if c.is_control() => {}
            c if (c as u32) < 0x80 => out.push(c as u8),
            '\u{a0}'..='\u{ff}' => out.push(c as u32 as u8),
            '\u{2018}' => out.push(0x91),
            '\u{2019}' => out.push(0x92),
            '\u{201c}' => out.push(0x93),
            '\u{201d}' => out.push(0x94),
            '\u{2022}' => out.push(0x95),
            '\u{2013}' => out.push(0x96),
            '\u{2014}' => out.push(0x97),
            '\u{2026}' => out.push(0x85),
            '\u{20ac}' => out.push(0x80),
            _ => out.push(b'?'),
        }
    }
    out
}
