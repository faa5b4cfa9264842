//! Field-by-field merging of style bags.
//!
//! A feature's inline `<Style>` refines whatever its `styleUrl` resolved to:
//! fields the inline style sets win, everything else is inherited.

use crate::model::{BalloonStyle, IconStyle, LabelStyle, LineStyle, PolyStyle, StyleBag};

/// Types whose optional fields can be overlaid.
pub trait Overlay: Clone {
    /// `self` with every field `top` sets replaced by `top`'s value.
    fn overlay(self, top: &Self) -> Self;
}

impl<T: Overlay> Overlay for Option<T> {
    fn overlay(self, top: &Self) -> Self {
        match (self, top) {
            (Some(base), Some(top)) => Some(base.overlay(top)),
            (None, Some(top)) => Some(top.clone()),
            (base, None) => base,
        }
    }
}

macro_rules! impl_overlay {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl Overlay for $ty {
            fn overlay(self, top: &Self) -> Self {
                Self {
                    $($field: top.$field.clone().or(self.$field),)+
                }
            }
        }
    };
}

impl_overlay!(IconStyle {
    color,
    color_mode,
    scale,
    heading,
    href,
    sub_region,
    hot_spot
});
impl_overlay!(LabelStyle {
    color,
    color_mode,
    scale
});
impl_overlay!(LineStyle {
    color,
    color_mode,
    width
});
impl_overlay!(PolyStyle {
    color,
    color_mode,
    fill,
    outline
});
impl_overlay!(BalloonStyle {
    bg_color,
    text_color,
    text,
    display_mode
});

impl Overlay for StyleBag {
    fn overlay(self, top: &Self) -> Self {
        StyleBag {
            icon: self.icon.overlay(&top.icon),
            label: self.label.overlay(&top.label),
            line: self.line.overlay(&top.line),
            poly: self.poly.overlay(&top.poly),
            balloon: self.balloon.overlay(&top.balloon),
        }
    }
}

/// Merge an inline style over a shared one.
pub fn merge(shared: StyleBag, inline: &StyleBag) -> StyleBag {
    shared.overlay(inline)
}
