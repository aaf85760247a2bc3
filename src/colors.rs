//! Color value interpretation for the color-bearing subset of parser nodes:
//! `rgb()`/`rgba()`/`hsl()`/`hsla()` functions, hex hashes and keyword
//! idents.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde_json::{json, Value};

use crate::node::Node;
use crate::parser::Parser;
use crate::tokenizer::Token;

/// An RGBA color with components in [0, 1], or the `currentColor` sentinel
/// (all components zero, `current_color` set).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
    pub current_color: bool,
}

fn clamp(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

fn hue(m1: f64, m2: f64, mut h: f64) -> f64 {
    if h < 0.0 {
        h += 1.0;
    }
    if h > 1.0 {
        h -= 1.0;
    }
    if h * 6.0 < 1.0 {
        return m1 + (m2 - m1) * h * 6.0;
    }
    if h * 2.0 < 1.0 {
        return m2;
    }
    if h * 3.0 < 2.0 {
        return m1 + (m2 - m1) * (2.0 / 3.0 - h) * 6.0;
    }
    m1
}

/// Normalize a degree value to [0, 1): `((⌊deg⌋ mod 360) + 360) mod 360 / 360`.
fn norm_deg(deg: f64) -> f64 {
    (((deg as i64 % 360) + 360) % 360) as f64 / 360.0
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color::rgba(r, g, b, 1.0)
    }

    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Color {
        Color {
            r: clamp(r),
            g: clamp(g),
            b: clamp(b),
            a: clamp(a),
            current_color: false,
        }
    }

    pub fn hsl(h: f64, s: f64, l: f64) -> Color {
        Color::hsla(h, s, l, 1.0)
    }

    /// HSL to RGB per the css3-color algorithm; hue is already normalized to
    /// [0, 1).
    pub fn hsla(h: f64, s: f64, l: f64, a: f64) -> Color {
        let h = clamp(h);
        let s = clamp(s);
        let l = clamp(l);
        let m2 = if l <= 0.5 { l * (s + 1.0) } else { l + s - l * s };
        let m1 = l * 2.0 - m2;
        Color {
            r: hue(m1, m2, h + 1.0 / 3.0),
            g: hue(m1, m2, h),
            b: hue(m1, m2, h - 1.0 / 3.0),
            a: clamp(a),
            current_color: false,
        }
    }

    pub fn transparent() -> Color {
        Color::default()
    }

    pub fn current_color() -> Color {
        Color {
            current_color: true,
            ..Color::default()
        }
    }

    /// Parse a standalone color value: parses the input as component values
    /// and interprets them.
    pub fn from_css(input: &str) -> Option<Color> {
        let nodes = Parser::from_css(input).parse_list_of_component_values();
        Color::from_nodes(&nodes)
    }

    /// Interpret a node sequence (a declaration's value list or a function's
    /// children). Leading whitespace is skipped; failure is `None`.
    pub fn from_nodes(nodes: &[Node]) -> Option<Color> {
        let first = nodes.iter().find(|node| !node.is_whitespace())?;
        match first {
            Node::Function { name, children } => function_color(name, children),
            Node::Hash { name, .. } => Color::from_hex_code(name),
            Node::Token(Token::Ident(name)) => Color::from_name(name),
            _ => None,
        }
    }

    /// Resolve a color keyword: `transparent`, `currentcolor`, then the
    /// basic and extended keyword tables. ASCII case-insensitive.
    pub fn from_name(name: &str) -> Option<Color> {
        let name = name.to_ascii_lowercase();
        if name == "transparent" {
            return Some(Color::transparent());
        }
        if name == "currentcolor" {
            return Some(Color::current_color());
        }
        let code = BASIC_COLOR_KEYWORDS
            .get(name.as_str())
            .or_else(|| EXTENDED_COLOR_KEYWORDS.get(name.as_str()))?;
        Color::from_hex_code(&code[1..])
    }

    /// Decode a 3- or 6-digit hex code, without the `#` marker.
    pub fn from_hex_code(code: &str) -> Option<Color> {
        if !code.is_ascii() {
            return None;
        }
        let (r, g, b) = match code.len() {
            3 => (
                hex_component(&code[0..1])?,
                hex_component(&code[1..2])?,
                hex_component(&code[2..3])?,
            ),
            6 => (
                hex_component(&code[0..2])?,
                hex_component(&code[2..4])?,
                hex_component(&code[4..6])?,
            ),
            _ => return None,
        };
        Some(Color {
            r,
            g,
            b,
            a: 1.0,
            current_color: false,
        })
    }

    /// The canonical serialisable structure: the string `"currentColor"` or
    /// `[r, g, b, a]`.
    pub fn test_repr(&self) -> Value {
        if self.current_color {
            return json!("currentColor");
        }
        json!([self.r, self.g, self.b, self.a])
    }
}

/// A one- or two-digit hex component scaled to [0, 1]; a single digit is
/// doubled (`a` → `aa`).
fn hex_component(code: &str) -> Option<f64> {
    let mut digits = code.chars();
    let x = digits.next()?.to_digit(16)?;
    let y = match digits.next() {
        Some(c) => c.to_digit(16)?,
        None => x,
    };
    Some((x * 16 + y) as f64 / 255.0)
}

/// Extract comma-separated non-whitespace parameters. A leading, doubled or
/// trailing comma yields no parameter list.
fn params(children: &[Node]) -> Option<Vec<&Node>> {
    let mut need_comma = false;
    let mut params = Vec::new();
    for value in children {
        if let Node::Token(token) = value {
            match token {
                Token::Whitespace => continue,
                Token::Comma => {
                    if !need_comma {
                        return None;
                    }
                    need_comma = false;
                    continue;
                }
                _ => {}
            }
        }
        if need_comma {
            return None;
        }
        params.push(value);
        need_comma = true;
    }
    if !need_comma && !params.is_empty() {
        return None;
    }
    Some(params)
}

/// Require exactly one numeric parameter per unit (`""` for unitless, `"%"`
/// for percentages) and return their values.
fn require_floats(children: &[Node], units: &[&str]) -> Option<Vec<f64>> {
    let params = params(children)?;
    if params.len() != units.len() {
        return None;
    }
    let mut floats = Vec::with_capacity(units.len());
    for (param, unit) in params.iter().zip(units) {
        match param {
            Node::Numeric { value, .. } if value.unit == *unit => floats.push(value.as_f64()),
            _ => return None,
        }
    }
    Some(floats)
}

fn function_color(name: &str, children: &[Node]) -> Option<Color> {
    match name.to_ascii_lowercase().as_str() {
        "rgb" => {
            if let Some(cs) = require_floats(children, &["", "", ""]) {
                return Some(Color::rgb(cs[0] / 255.0, cs[1] / 255.0, cs[2] / 255.0));
            }
            if let Some(cs) = require_floats(children, &["%", "%", "%"]) {
                return Some(Color::rgb(cs[0] / 100.0, cs[1] / 100.0, cs[2] / 100.0));
            }
            None
        }
        "rgba" => {
            if let Some(cs) = require_floats(children, &["", "", "", ""]) {
                return Some(Color::rgba(
                    cs[0] / 255.0,
                    cs[1] / 255.0,
                    cs[2] / 255.0,
                    cs[3],
                ));
            }
            if let Some(cs) = require_floats(children, &["%", "%", "%", ""]) {
                return Some(Color::rgba(
                    cs[0] / 100.0,
                    cs[1] / 100.0,
                    cs[2] / 100.0,
                    cs[3],
                ));
            }
            None
        }
        "hsl" => {
            let cs = require_floats(children, &["", "%", "%"])?;
            Some(Color::hsl(norm_deg(cs[0]), cs[1] / 100.0, cs[2] / 100.0))
        }
        "hsla" => {
            let cs = require_floats(children, &["", "%", "%", ""])?;
            Some(Color::hsla(
                norm_deg(cs[0]),
                cs[1] / 100.0,
                cs[2] / 100.0,
                cs[3],
            ))
        }
        _ => None,
    }
}

lazy_static! {
    /// The 16 basic color keywords of css3-color §4.1.
    pub static ref BASIC_COLOR_KEYWORDS: HashMap<&'static str, &'static str> = HashMap::from([
        ("black", "#000000"),
        ("silver", "#c0c0c0"),
        ("gray", "#808080"),
        ("white", "#ffffff"),
        ("maroon", "#800000"),
        ("red", "#ff0000"),
        ("purple", "#800080"),
        ("fuchsia", "#ff00ff"),
        ("green", "#008000"),
        ("lime", "#00ff00"),
        ("olive", "#808000"),
        ("yellow", "#ffff00"),
        ("navy", "#000080"),
        ("blue", "#0000ff"),
        ("teal", "#008080"),
        ("aqua", "#00ffff"),
    ]);

    /// The extended (SVG) color keywords of css3-color §4.3.
    pub static ref EXTENDED_COLOR_KEYWORDS: HashMap<&'static str, &'static str> = HashMap::from([
        ("aliceblue", "#f0f8ff"),
        ("antiquewhite", "#faebd7"),
        ("aqua", "#00ffff"),
        ("aquamarine", "#7fffd4"),
        ("azure", "#f0ffff"),
        ("beige", "#f5f5dc"),
        ("bisque", "#ffe4c4"),
        ("black", "#000000"),
        ("blanchedalmond", "#ffebcd"),
        ("blue", "#0000ff"),
        ("blueviolet", "#8a2be2"),
        ("brown", "#a52a2a"),
        ("burlywood", "#deb887"),
        ("cadetblue", "#5f9ea0"),
        ("chartreuse", "#7fff00"),
        ("chocolate", "#d2691e"),
        ("coral", "#ff7f50"),
        ("cornflowerblue", "#6495ed"),
        ("cornsilk", "#fff8dc"),
        ("crimson", "#dc143c"),
        ("cyan", "#00ffff"),
        ("darkblue", "#00008b"),
        ("darkcyan", "#008b8b"),
        ("darkgoldenrod", "#b8860b"),
        ("darkgray", "#a9a9a9"),
        ("darkgreen", "#006400"),
        ("darkgrey", "#a9a9a9"),
        ("darkkhaki", "#bdb76b"),
        ("darkmagenta", "#8b008b"),
        ("darkolivegreen", "#556b2f"),
        ("darkorange", "#ff8c00"),
        ("darkorchid", "#9932cc"),
        ("darkred", "#8b0000"),
        ("darksalmon", "#e9967a"),
        ("darkseagreen", "#8fbc8f"),
        ("darkslateblue", "#483d8b"),
        ("darkslategray", "#2f4f4f"),
        ("darkslategrey", "#2f4f4f"),
        ("darkturquoise", "#00ced1"),
        ("darkviolet", "#9400d3"),
        ("deeppink", "#ff1493"),
        ("deepskyblue", "#00bfff"),
        ("dimgray", "#696969"),
        ("dimgrey", "#696969"),
        ("dodgerblue", "#1e90ff"),
        ("firebrick", "#b22222"),
        ("floralwhite", "#fffaf0"),
        ("forestgreen", "#228b22"),
        ("fuchsia", "#ff00ff"),
        ("gainsboro", "#dcdcdc"),
        ("ghostwhite", "#f8f8ff"),
        ("gold", "#ffd700"),
        ("goldenrod", "#daa520"),
        ("gray", "#808080"),
        ("green", "#008000"),
        ("greenyellow", "#adff2f"),
        ("grey", "#808080"),
        ("honeydew", "#f0fff0"),
        ("hotpink", "#ff69b4"),
        ("indianred", "#cd5c5c"),
        ("indigo", "#4b0082"),
        ("ivory", "#fffff0"),
        ("khaki", "#f0e68c"),
        ("lavender", "#e6e6fa"),
        ("lavenderblush", "#fff0f5"),
        ("lawngreen", "#7cfc00"),
        ("lemonchiffon", "#fffacd"),
        ("lightblue", "#add8e6"),
        ("lightcoral", "#f08080"),
        ("lightcyan", "#e0ffff"),
        ("lightgoldenrodyellow", "#fafad2"),
        ("lightgray", "#d3d3d3"),
        ("lightgreen", "#90ee90"),
        ("lightgrey", "#d3d3d3"),
        ("lightpink", "#ffb6c1"),
        ("lightsalmon", "#ffa07a"),
        ("lightseagreen", "#20b2aa"),
        ("lightskyblue", "#87cefa"),
        ("lightslategray", "#778899"),
        ("lightslategrey", "#778899"),
        ("lightsteelblue", "#b0c4de"),
        ("lightyellow", "#ffffe0"),
        ("lime", "#00ff00"),
        ("limegreen", "#32cd32"),
        ("linen", "#faf0e6"),
        ("magenta", "#ff00ff"),
        ("maroon", "#800000"),
        ("mediumaquamarine", "#66cdaa"),
        ("mediumblue", "#0000cd"),
        ("mediumorchid", "#ba55d3"),
        ("mediumpurple", "#9370db"),
        ("mediumseagreen", "#3cb371"),
        ("mediumslateblue", "#7b68ee"),
        ("mediumspringgreen", "#00fa9a"),
        ("mediumturquoise", "#48d1cc"),
        ("mediumvioletred", "#c71585"),
        ("midnightblue", "#191970"),
        ("mintcream", "#f5fffa"),
        ("mistyrose", "#ffe4e1"),
        ("moccasin", "#ffe4b5"),
        ("navajowhite", "#ffdead"),
        ("navy", "#000080"),
        ("oldlace", "#fdf5e6"),
        ("olive", "#808000"),
        ("olivedrab", "#6b8e23"),
        ("orange", "#ffa500"),
        ("orangered", "#ff4500"),
        ("orchid", "#da70d6"),
        ("palegoldenrod", "#eee8aa"),
        ("palegreen", "#98fb98"),
        ("paleturquoise", "#afeeee"),
        ("palevioletred", "#db7093"),
        ("papayawhip", "#ffefd5"),
        ("peachpuff", "#ffdab9"),
        ("peru", "#cd853f"),
        ("pink", "#ffc0cb"),
        ("plum", "#dda0dd"),
        ("powderblue", "#b0e0e6"),
        ("purple", "#800080"),
        ("red", "#ff0000"),
        ("rosybrown", "#bc8f8f"),
        ("royalblue", "#4169e1"),
        ("saddlebrown", "#8b4513"),
        ("salmon", "#fa8072"),
        ("sandybrown", "#f4a460"),
        ("seagreen", "#2e8b57"),
        ("seashell", "#fff5ee"),
        ("sienna", "#a0522d"),
        ("silver", "#c0c0c0"),
        ("skyblue", "#87ceeb"),
        ("slateblue", "#6a5acd"),
        ("slategray", "#708090"),
        ("slategrey", "#708090"),
        ("snow", "#fffafa"),
        ("springgreen", "#00ff7f"),
        ("steelblue", "#4682b4"),
        ("tan", "#d2b48c"),
        ("teal", "#008080"),
        ("thistle", "#d8bfd8"),
        ("tomato", "#ff6347"),
        ("turquoise", "#40e0d0"),
        ("violet", "#ee82ee"),
        ("wheat", "#f5deb3"),
        ("white", "#ffffff"),
        ("whitesmoke", "#f5f5f5"),
        ("yellow", "#ffff00"),
        ("yellowgreen", "#9acd32"),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_color(input: &str, expected: (f64, f64, f64, f64)) {
        let color = Color::from_css(input).unwrap_or_else(|| panic!("no color for {input:?}"));
        assert!(!color.current_color, "input: {input:?}");
        let (r, g, b, a) = expected;
        assert!((color.r - r).abs() < EPSILON, "r for {input:?}: {color:?}");
        assert!((color.g - g).abs() < EPSILON, "g for {input:?}: {color:?}");
        assert!((color.b - b).abs() < EPSILON, "b for {input:?}: {color:?}");
        assert!((color.a - a).abs() < EPSILON, "a for {input:?}: {color:?}");
    }

    #[test]
    fn rgb_functions() {
        assert_color("rgb(255, 0, 0)", (1.0, 0.0, 0.0, 1.0));
        assert_color("rgb(100%, 0%, 0%)", (1.0, 0.0, 0.0, 1.0));
        assert_color("rgb( 0 , 128 , 255 )", (0.0, 128.0 / 255.0, 1.0, 1.0));
        assert_color("RGB(0, 0, 0)", (0.0, 0.0, 0.0, 1.0));
        // out-of-range components clamp
        assert_color("rgb(300, -10, 0)", (1.0, 0.0, 0.0, 1.0));
        assert_color("rgb(-10%, 120%, 0%)", (0.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn rgba_functions() {
        assert_color("rgba(255, 0, 0, 0.5)", (1.0, 0.0, 0.0, 0.5));
        assert_color("rgba(100%, 0%, 0%, 0.25)", (1.0, 0.0, 0.0, 0.25));
        assert_color("rgba(0, 0, 0, 2)", (0.0, 0.0, 0.0, 1.0));
        assert_color("rgba(0, 0, 0, -1)", (0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn hsl_functions() {
        assert_color("hsl(0, 100%, 50%)", (1.0, 0.0, 0.0, 1.0));
        assert_color("hsl(120, 100%, 50%)", (0.0, 1.0, 0.0, 1.0));
        assert_color("hsl(240, 100%, 50%)", (0.0, 0.0, 1.0, 1.0));
        assert_color("hsl(480, 100%, 50%)", (0.0, 1.0, 0.0, 1.0));
        assert_color("hsl(-240, 100%, 50%)", (0.0, 1.0, 0.0, 1.0));
        assert_color("hsl(0, 0%, 50%)", (0.5, 0.5, 0.5, 1.0));
        assert_color("hsla(120, 100%, 50%, 0.5)", (0.0, 1.0, 0.0, 0.5));
    }

    #[test]
    fn hsl_round_trip() {
        for (h, expected) in [
            (0.0, (1.0, 0.0, 0.0)),
            (1.0 / 3.0, (0.0, 1.0, 0.0)),
            (2.0 / 3.0, (0.0, 0.0, 1.0)),
        ] {
            let color = Color::hsl(h, 1.0, 0.5);
            assert!((color.r - expected.0).abs() < EPSILON);
            assert!((color.g - expected.1).abs() < EPSILON);
            assert!((color.b - expected.2).abs() < EPSILON);
        }
    }

    #[test]
    fn hex_codes() {
        assert_color("#f00", (1.0, 0.0, 0.0, 1.0));
        assert_color("#abc", (0xaa as f64 / 255.0, 0xbb as f64 / 255.0, 0xcc as f64 / 255.0, 1.0));
        assert_color("#ff0000", (1.0, 0.0, 0.0, 1.0));
        assert_color("#0080ff", (0.0, 128.0 / 255.0, 1.0, 1.0));
        assert_eq!(Color::from_css("#ff00"), None);
        assert_eq!(Color::from_css("#fg0"), None);
        assert_eq!(Color::from_css("#€ab"), None);
    }

    #[test]
    fn keywords() {
        assert_color("red", (1.0, 0.0, 0.0, 1.0));
        assert_color("Red", (1.0, 0.0, 0.0, 1.0));
        assert_color("dodgerblue", (0x1e as f64 / 255.0, 0x90 as f64 / 255.0, 1.0, 1.0));
        // the basic table wins, but both tables agree on shared names
        assert_color("teal", (0.0, 128.0 / 255.0, 128.0 / 255.0, 1.0));
        assert_eq!(Color::from_css("notacolor"), None);
    }

    #[test]
    fn keyword_lookup_is_case_insensitive_for_every_entry() {
        for name in BASIC_COLOR_KEYWORDS
            .keys()
            .chain(EXTENDED_COLOR_KEYWORDS.keys())
        {
            let lower = Color::from_name(name).unwrap();
            let upper = Color::from_name(&name.to_ascii_uppercase()).unwrap();
            assert_eq!(lower, upper, "keyword: {name}");
        }
    }

    #[test]
    fn sentinels() {
        assert_eq!(
            Color::from_css("transparent"),
            Some(Color::rgba(0.0, 0.0, 0.0, 0.0))
        );
        let current = Color::from_css("currentColor").unwrap();
        assert!(current.current_color);
        assert_eq!(current.test_repr(), json!("currentColor"));
    }

    #[test]
    fn leading_whitespace_is_skipped() {
        assert_color("  \t red", (1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn rejections() {
        let cases = vec![
            "",
            " ",
            "rgb()",
            "rgb(1, 2)",
            "rgb(1, 2, 3, 4)",
            "rgb(1, 2%, 3)",
            "rgb(1 2 3)",
            "rgb(, 1, 2, 3)",
            "rgb(1, , 2, 3)",
            "rgb(1, 2, 3,)",
            "rgb(a, b, c)",
            "hsl(120, 50, 50)",
            "hsl(120%, 50%, 50%)",
            "hsla(120, 50%, 50%)",
            "12px",
            "\"red\"",
            "url(red)",
        ];
        for input in cases {
            assert_eq!(Color::from_css(input), None, "input: {input:?}");
        }
    }

    #[test]
    fn test_repr_shape() {
        assert_eq!(
            Color::rgb(1.0, 0.0, 0.0).test_repr(),
            json!([1.0, 0.0, 0.0, 1.0])
        );
    }
}
