//! Drag-region overlay.
//!
//! The borderless player window has no native title bar, so every part of
//! the content surface acts as a window-move handle unless it is an
//! interactive control. The classification lives here as plain data; it is
//! rendered to a stylesheet for engines that honour `-webkit-app-region`, and
//! to a single selector the JS bridge uses for pointer hit-testing on engines
//! that do not.

/// How a region of the content surface reacts to a pointer press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionClass {
    /// Pressing and dragging moves the window.
    Drag,
    /// The press goes to the element underneath.
    NoDrag,
}

/// A named group of selectors sharing one classification.
#[derive(Debug, Clone, Copy)]
pub struct RegionRule {
    pub group: &'static str,
    pub class: RegionClass,
    pub selectors: &'static [&'static str],
}

/// Background fill keeping fully transparent containers hit-testable.
pub const HIT_TEST_FILL: &str = "rgba(0,0,0,0.01)";

const PLAYER_CONTAINERS: &[&str] = &["#main-window", "#equalizer-window", "#playlist-window"];

const DRAG_RULES: &[RegionRule] = &[
    RegionRule {
        group: "containers",
        class: RegionClass::Drag,
        selectors: PLAYER_CONTAINERS,
    },
    RegionRule {
        group: "title-bars",
        class: RegionClass::Drag,
        selectors: &["#title-bar", ".equalizer-top.title-bar"],
    },
    RegionRule {
        group: "playlist-frame",
        class: RegionClass::Drag,
        selectors: &[
            ".playlist-top",
            ".playlist-top-left",
            ".playlist-top-left-spacer",
            ".playlist-top-left-fill",
            ".playlist-top-title",
            ".playlist-top-right-spacer",
            ".playlist-top-right-fill",
            ".playlist-top-right",
            ".playlist-middle",
            ".playlist-middle-left",
            ".playlist-bottom",
            ".playlist-bottom-left",
            ".playlist-bottom-center",
            ".playlist-bottom-right",
        ],
    },
];

const NO_DRAG_RULES: &[RegionRule] = &[
    RegionRule {
        group: "generic-controls",
        class: RegionClass::NoDrag,
        selectors: &[
            "button",
            "a",
            "input",
            "textarea",
            "select",
            "canvas",
            "video",
            "audio",
            "[role=\"button\"]",
            "[contenteditable]",
        ],
    },
    // anything with a tooltip is a control in this UI
    RegionRule {
        group: "titled",
        class: RegionClass::NoDrag,
        selectors: &["div[title]", "a[title]", "input[title]", "canvas[title]"],
    },
    RegionRule {
        group: "transport",
        class: RegionClass::NoDrag,
        selectors: &[
            "#option",
            "#minimize",
            "#shade",
            "#close",
            "#button-o",
            "#button-a",
            "#button-i",
            "#button-d",
            "#button-v",
            "#play-pause",
            "#work-indicator",
            "#position",
            "#volume",
            "#balance",
            "#visualizer",
            "#previous",
            "#play",
            "#pause",
            "#stop",
            "#next",
            "#eject",
            "#shuffle",
            "#repeat",
            "#about",
        ],
    },
    RegionRule {
        group: "window-toggles",
        class: RegionClass::NoDrag,
        selectors: &["#windows", "#equalizer-button", "#playlist-button"],
    },
    RegionRule {
        group: "equalizer",
        class: RegionClass::NoDrag,
        selectors: &[
            "#equalizer-close",
            "#equalizer-shade",
            "#on",
            "#auto",
            "#eqGraph",
            ".band",
            ".rc-slider",
            ".rc-slider-rail",
            ".rc-slider-track",
            ".rc-slider-step",
            ".rc-slider-handle",
            ".rc-slider-mark",
        ],
    },
    RegionRule {
        group: "playlist",
        class: RegionClass::NoDrag,
        selectors: &[
            "#playlist-window .playlist-tracks",
            "#playlist-window .playlist-track-titles",
            "#playlist-window .playlist-track-durations",
            "#playlist-window .playlist-scrollbar",
            "#playlist-window .playlist-scrollbar-handle",
            "#playlist-window .playlist-action-buttons",
            "#playlist-window .playlist-previous-button",
            "#playlist-window .playlist-play-button",
            "#playlist-window .playlist-pause-button",
            "#playlist-window .playlist-stop-button",
            "#playlist-window .playlist-next-button",
            "#playlist-window .playlist-eject-button",
            "#playlist-window #playlist-shade-button",
            "#playlist-window #playlist-close-button",
            "#playlist-window #playlist-list-menu",
            "#playlist-window #playlist-scroll-up-button",
            "#playlist-window #playlist-scroll-down-button",
            "#playlist-window #playlist-resize-target",
            "#playlist-window .track-cell",
            "#playlist-window .mini-time",
        ],
    },
    RegionRule {
        group: "playlist-menus",
        class: RegionClass::NoDrag,
        selectors: &[
            "#playlist-add-menu",
            "#playlist-remove-menu",
            "#playlist-selection-menu",
            "#playlist-misc-menu",
        ],
    },
    RegionRule {
        group: "escape-hatch",
        class: RegionClass::NoDrag,
        selectors: &[".no-drag"],
    },
];

/// The full overlay: surface default plus explicit rules.
#[derive(Debug, Clone, Copy)]
pub struct DragOverlay {
    pub surface_default: RegionClass,
    pub drag: &'static [RegionRule],
    pub no_drag: &'static [RegionRule],
    pub hit_test_fill: &'static [&'static str],
}

/// The overlay used for the Webamp skin.
pub const WEBAMP_OVERLAY: DragOverlay = DragOverlay {
    surface_default: RegionClass::Drag,
    drag: DRAG_RULES,
    no_drag: NO_DRAG_RULES,
    hit_test_fill: PLAYER_CONTAINERS,
};

impl Default for DragOverlay {
    fn default() -> Self {
        WEBAMP_OVERLAY
    }
}

/// What gets pushed into the content surface after a document load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayPayload {
    pub stylesheet: String,
    pub no_drag_selector: String,
    pub drag_selector: String,
    /// Presses matching neither selector move the window.
    pub surface_draggable: bool,
}

impl DragOverlay {
    pub fn rules(&self) -> impl Iterator<Item = &RegionRule> {
        self.drag.iter().chain(self.no_drag.iter())
    }

    pub fn no_drag_selectors(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.no_drag.iter().flat_map(|rule| rule.selectors.iter().copied())
    }

    /// All no-drag selectors as one selector list.
    pub fn no_drag_selector(&self) -> String {
        self.no_drag_selectors().collect::<Vec<_>>().join(", ")
    }

    /// Classify an element. `matches` reports whether the element (or one of
    /// its ancestors) matches a selector; an interactive match always wins.
    pub fn classify(&self, matches: impl Fn(&str) -> bool) -> RegionClass {
        if self.no_drag_selectors().any(&matches) {
            return RegionClass::NoDrag;
        }
        let explicit_drag = self
            .drag
            .iter()
            .flat_map(|rule| rule.selectors.iter())
            .any(|selector| matches(selector));
        if explicit_drag {
            RegionClass::Drag
        } else {
            self.surface_default
        }
    }

    /// Explicitly draggable selectors as one selector list.
    pub fn drag_selector(&self) -> String {
        self.drag
            .iter()
            .flat_map(|rule| rule.selectors.iter().copied())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Render the overlay as a stylesheet, one rule per line.
    pub fn stylesheet(&self) -> String {
        let base = app_region(self.surface_default);
        let mut lines = vec![
            "html, body { height: 100%; }".to_string(),
            format!(
                "body {{ margin: 0; background: transparent; -webkit-app-region: {base}; -webkit-user-select: none; }}"
            ),
        ];
        lines.extend(self.drag.iter().map(|rule| {
            format!("{} {{ -webkit-app-region: drag; }}", rule.selectors.join(", "))
        }));
        let no_drag = self.no_drag_selector();
        if !no_drag.is_empty() {
            lines.push(format!(
                "{no_drag} {{ -webkit-app-region: no-drag !important; pointer-events: auto !important; }}"
            ));
        }
        if !self.hit_test_fill.is_empty() {
            lines.push(format!(
                "{} {{ background-color: {HIT_TEST_FILL}; }}",
                self.hit_test_fill.join(", ")
            ));
        }
        let mut css = lines.join("\n");
        css.push('\n');
        css
    }

    /// Everything the bridge needs to reproduce [`DragOverlay::classify`]
    /// for a pointer press.
    pub fn payload(&self) -> OverlayPayload {
        OverlayPayload {
            stylesheet: self.stylesheet(),
            no_drag_selector: self.no_drag_selector(),
            drag_selector: self.drag_selector(),
            surface_draggable: self.surface_default == RegionClass::Drag,
        }
    }
}

fn app_region(class: RegionClass) -> &'static str {
    match class {
        RegionClass::Drag => "drag",
        RegionClass::NoDrag => "no-drag",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(selectors: &'static [&'static str]) -> impl Fn(&str) -> bool {
        move |candidate| selectors.iter().any(|s| *s == candidate)
    }

    #[test]
    fn bare_surface_is_draggable() {
        assert_eq!(WEBAMP_OVERLAY.classify(|_| false), RegionClass::Drag);
    }

    #[test]
    fn transport_controls_are_not_draggable() {
        for id in ["#play", "#volume", "#close", "#eject"] {
            let class = WEBAMP_OVERLAY.classify(move |s| s == id || s == "#main-window");
            assert_eq!(class, RegionClass::NoDrag, "{id}");
        }
    }

    #[test]
    fn interactive_match_beats_drag_container() {
        let class = WEBAMP_OVERLAY.classify(only(&["#playlist-window", ".playlist-middle", ".no-drag"]));
        assert_eq!(class, RegionClass::NoDrag);
    }

    #[test]
    fn title_bar_is_draggable() {
        assert_eq!(
            WEBAMP_OVERLAY.classify(only(&["#title-bar", "#main-window"])),
            RegionClass::Drag
        );
    }

    #[test]
    fn every_rule_group_is_populated_and_named_uniquely() {
        let mut names: Vec<_> = WEBAMP_OVERLAY.rules().map(|r| r.group).collect();
        assert!(WEBAMP_OVERLAY.rules().all(|r| !r.selectors.is_empty()));
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), before);
    }

    #[test]
    fn rule_classes_match_their_lists() {
        assert!(WEBAMP_OVERLAY.drag.iter().all(|r| r.class == RegionClass::Drag));
        assert!(WEBAMP_OVERLAY.no_drag.iter().all(|r| r.class == RegionClass::NoDrag));
    }

    #[test]
    fn stylesheet_marks_surface_controls_and_fill() {
        let css = WEBAMP_OVERLAY.stylesheet();
        assert!(css.contains("-webkit-app-region: drag; -webkit-user-select: none;"));
        assert!(css.contains("#title-bar, .equalizer-top.title-bar { -webkit-app-region: drag; }"));
        assert!(css.contains("-webkit-app-region: no-drag !important; pointer-events: auto !important;"));
        assert!(css.contains(
            "#main-window, #equalizer-window, #playlist-window { background-color: rgba(0,0,0,0.01); }"
        ));
    }

    #[test]
    fn no_drag_selector_lists_every_control_once() {
        let selector = WEBAMP_OVERLAY.no_drag_selector();
        assert!(selector.starts_with("button, a, input"));
        assert!(selector.ends_with(".no-drag"));
        assert!(selector.contains("#playlist-window #playlist-resize-target"));
        let count = selector.split(", ").count();
        assert_eq!(count, WEBAMP_OVERLAY.no_drag_selectors().count());
    }

    #[test]
    fn payload_bundles_both_renderings() {
        let payload = WEBAMP_OVERLAY.payload();
        assert_eq!(payload.stylesheet, WEBAMP_OVERLAY.stylesheet());
        assert_eq!(payload.no_drag_selector, WEBAMP_OVERLAY.no_drag_selector());
        assert!(payload.surface_draggable);
    }

    #[test]
    fn drag_selector_covers_containers_and_title_strips() {
        let selector = WEBAMP_OVERLAY.drag_selector();
        for part in ["#main-window", "#title-bar", ".equalizer-top.title-bar"] {
            assert!(selector.split(", ").any(|s| s == part), "{part}");
        }
        let payload = WEBAMP_OVERLAY.payload();
        assert_eq!(payload.drag_selector, selector);
    }

    #[test]
    fn stylesheet_is_one_rule_per_line() {
        let css = WEBAMP_OVERLAY.stylesheet();
        assert!(css.ends_with('\n'));
        assert_eq!(css.lines().count(), 2 + WEBAMP_OVERLAY.drag.len() + 2);
        assert!(css.lines().all(|line| line.trim_end().ends_with('}')));
    }
}
