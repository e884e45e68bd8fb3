//! Named colours understood by the assistant, as CIE xy points.

use crate::model::Xy;

const NAMED_COLORS: [(&str, Xy); 8] = [
    ("red", Xy::new(0.67, 0.32)),
    ("green", Xy::new(0.41, 0.52)),
    ("blue", Xy::new(0.17, 0.04)),
    ("warm", Xy::new(0.46, 0.41)),
    ("cool", Xy::new(0.31, 0.33)),
    ("white", Xy::new(0.32, 0.33)),
    ("purple", Xy::new(0.27, 0.13)),
    ("orange", Xy::new(0.56, 0.40)),
];

/// Look up a colour by name, case-insensitively.
pub fn named_color(name: &str) -> Option<Xy> {
    let name = name.trim();
    NAMED_COLORS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, xy)| *xy)
}

/// All recognised colour names, in table order.
pub fn color_names() -> impl Iterator<Item = &'static str> {
    NAMED_COLORS.iter().map(|(n, _)| *n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let purple = named_color(" Purple ");
        assert_eq!(purple, Some(Xy::new(0.27, 0.13)));
        assert_eq!(named_color("RED"), Some(Xy::new(0.67, 0.32)));
    }

    #[test]
    fn unknown_color_is_none() {
        assert_eq!(named_color("chartreuse"), None);
        assert_eq!(color_names().count(), 8);
    }
}
