//! Mermaid palettes.
//!
//! The light render uses Mermaid's stock `default` theme. The dark render
//! uses `base` with the variables below so diagrams sit on the site's dark
//! background without a white box around them.

pub const LIGHT_THEME: &str = "default";
pub const DARK_THEME: &str = "base";

pub const DARK_THEME_VARIABLES: &[(&str, &str)] = &[
    ("darkMode", "true"),
    ("background", "transparent"),
    ("fontFamily", "Inter, ui-sans-serif, system-ui, sans-serif"),
    ("primaryColor", "#1f2937"),
    ("primaryTextColor", "#e5e7eb"),
    ("primaryBorderColor", "#4b5563"),
    ("secondaryColor", "#273449"),
    ("secondaryTextColor", "#e5e7eb"),
    ("secondaryBorderColor", "#4b5563"),
    ("tertiaryColor", "#111827"),
    ("tertiaryTextColor", "#d1d5db"),
    ("tertiaryBorderColor", "#374151"),
    ("mainBkg", "#1f2937"),
    ("secondBkg", "#273449"),
    ("nodeBorder", "#6b7280"),
    ("nodeTextColor", "#e5e7eb"),
    ("textColor", "#e5e7eb"),
    ("lineColor", "#9ca3af"),
    ("defaultLinkColor", "#9ca3af"),
    ("titleColor", "#f3f4f6"),
    ("edgeLabelBackground", "#111827"),
    ("clusterBkg", "#161e2b"),
    ("clusterBorder", "#4b5563"),
    ("labelBackground", "#111827"),
    ("labelTextColor", "#e5e7eb"),
    ("actorBkg", "#1f2937"),
    ("actorBorder", "#6b7280"),
    ("actorTextColor", "#e5e7eb"),
    ("actorLineColor", "#6b7280"),
    ("signalColor", "#d1d5db"),
    ("signalTextColor", "#e5e7eb"),
    ("labelBoxBkgColor", "#1f2937"),
    ("labelBoxBorderColor", "#6b7280"),
    ("loopTextColor", "#e5e7eb"),
    ("activationBkgColor", "#374151"),
    ("activationBorderColor", "#9ca3af"),
    ("sequenceNumberColor", "#111827"),
    ("noteBkgColor", "#3b3524"),
    ("noteTextColor", "#f5f0dc"),
    ("noteBorderColor", "#8a7a4a"),
    ("classText", "#e5e7eb"),
    ("stateLabelColor", "#e5e7eb"),
    ("altBackground", "#161e2b"),
    ("errorBkgColor", "#5b1f1f"),
    ("errorTextColor", "#fecaca"),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_dark_palette_has_unique_keys() {
        let keys: HashSet<_> = DARK_THEME_VARIABLES.iter().map(|(k, _)| k).collect();
        assert_eq!(keys.len(), DARK_THEME_VARIABLES.len());
        assert!(keys.contains(&"darkMode"));
    }
}
