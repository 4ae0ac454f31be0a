//! Character-level Unicode classification and kana transliteration.

/// Check the full Hiragana block (U+3040..U+309F). This includes a few
/// unassigned codepoints (U+3040, U+3097-3098) but these never appear in
/// IME input or dictionary readings, so the block-level check is preferred
/// over an exact range for clarity.
pub fn is_hiragana(c: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&c)
}

/// Check the full Katakana block (U+30A0..U+30FF).
pub fn is_katakana(c: char) -> bool {
    ('\u{30A0}'..='\u{30FF}').contains(&c)
}

pub fn is_kanji(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
        || ('\u{3400}'..='\u{4DBF}').contains(&c)
        || ('\u{20000}'..='\u{2A6DF}').contains(&c)
}

pub fn is_ascii_alpha(c: char) -> bool {
    c.is_ascii_alphabetic()
}

pub fn is_fullwidth_digit(c: char) -> bool {
    ('０'..='９').contains(&c)
}

pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || is_fullwidth_digit(c)
}

/// Check if a string is a valid hiragana reading.
///
/// Accepts hiragana characters and the prolonged sound mark ー (U+30FC,
/// technically katakana) which commonly appears in readings like
/// "らーめん".
pub fn is_hiragana_reading(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| is_hiragana(c) || c == 'ー')
}

/// Convert a hiragana string to full-width katakana.
/// Non-hiragana characters (ー, ASCII, etc.) are passed through unchanged.
pub fn hiragana_to_katakana(s: &str) -> String {
    s.chars()
        .map(|c| {
            if ('\u{3041}'..='\u{3096}').contains(&c) {
                char::from_u32(c as u32 + 0x60).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Convert ASCII digits to their full-width forms.
pub fn digits_to_fullwidth(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_digit() {
                char::from_u32(c as u32 - '0' as u32 + '０' as u32).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Convert full-width digits to ASCII digits.
pub fn digits_to_halfwidth(s: &str) -> String {
    s.chars()
        .map(|c| {
            if is_fullwidth_digit(c) {
                char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Half-width form of a single full-width katakana character.
/// Voiced and semi-voiced characters decompose into base + mark.
fn halfwidth_kana(c: char) -> Option<&'static str> {
    let s = match c {
        'ア' => "ｱ", 'イ' => "ｲ", 'ウ' => "ｳ", 'エ' => "ｴ", 'オ' => "ｵ",
        'カ' => "ｶ", 'キ' => "ｷ", 'ク' => "ｸ", 'ケ' => "ｹ", 'コ' => "ｺ",
        'サ' => "ｻ", 'シ' => "ｼ", 'ス' => "ｽ", 'セ' => "ｾ", 'ソ' => "ｿ",
        'タ' => "ﾀ", 'チ' => "ﾁ", 'ツ' => "ﾂ", 'テ' => "ﾃ", 'ト' => "ﾄ",
        'ナ' => "ﾅ", 'ニ' => "ﾆ", 'ヌ' => "ﾇ", 'ネ' => "ﾈ", 'ノ' => "ﾉ",
        'ハ' => "ﾊ", 'ヒ' => "ﾋ", 'フ' => "ﾌ", 'ヘ' => "ﾍ", 'ホ' => "ﾎ",
        'マ' => "ﾏ", 'ミ' => "ﾐ", 'ム' => "ﾑ", 'メ' => "ﾒ", 'モ' => "ﾓ",
        'ヤ' => "ﾔ", 'ユ' => "ﾕ", 'ヨ' => "ﾖ",
        'ラ' => "ﾗ", 'リ' => "ﾘ", 'ル' => "ﾙ", 'レ' => "ﾚ", 'ロ' => "ﾛ",
        'ワ' => "ﾜ", 'ヲ' => "ｦ", 'ン' => "ﾝ",
        'ァ' => "ｧ", 'ィ' => "ｨ", 'ゥ' => "ｩ", 'ェ' => "ｪ", 'ォ' => "ｫ",
        'ッ' => "ｯ", 'ャ' => "ｬ", 'ュ' => "ｭ", 'ョ' => "ｮ",
        'ガ' => "ｶﾞ", 'ギ' => "ｷﾞ", 'グ' => "ｸﾞ", 'ゲ' => "ｹﾞ", 'ゴ' => "ｺﾞ",
        'ザ' => "ｻﾞ", 'ジ' => "ｼﾞ", 'ズ' => "ｽﾞ", 'ゼ' => "ｾﾞ", 'ゾ' => "ｿﾞ",
        'ダ' => "ﾀﾞ", 'ヂ' => "ﾁﾞ", 'ヅ' => "ﾂﾞ", 'デ' => "ﾃﾞ", 'ド' => "ﾄﾞ",
        'バ' => "ﾊﾞ", 'ビ' => "ﾋﾞ", 'ブ' => "ﾌﾞ", 'ベ' => "ﾍﾞ", 'ボ' => "ﾎﾞ",
        'パ' => "ﾊﾟ", 'ピ' => "ﾋﾟ", 'プ' => "ﾌﾟ", 'ペ' => "ﾍﾟ", 'ポ' => "ﾎﾟ",
        'ヴ' => "ｳﾞ",
        'ー' => "ｰ", '。' => "｡", '、' => "､", '「' => "｢", '」' => "｣", '・' => "･",
        _ => return None,
    };
    Some(s)
}

/// Convert full-width katakana to half-width katakana.
/// Characters without a half-width form are passed through unchanged.
pub fn katakana_to_halfwidth(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match halfwidth_kana(c) {
            Some(h) => out.push_str(h),
            None => out.push(c),
        }
    }
    out
}
