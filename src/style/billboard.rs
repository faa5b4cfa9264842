//! Screen-space presentation derived from a resolved style.

use crate::model::{
    Billboard, Cartesian2, Cartesian3, HotSpot, HotSpotUnits, IconStyle, Label, LabelStyle,
};

/// Build the billboard for an `IconStyle`.
///
/// `icon_size` is the edge length in pixels the icon is drawn at before
/// scaling; hot-spot offsets are measured against it.
pub fn billboard(icon: &IconStyle, icon_size: f64) -> Billboard {
    let scale = icon.scale.unwrap_or(1.0);
    Billboard {
        image: icon.href.clone(),
        image_sub_region: icon.sub_region,
        scale: icon.scale,
        color: icon.color,
        rotation: icon.heading.map(|heading| -heading.to_radians()),
        aligned_axis: icon.heading.map(|_| Cartesian3::UNIT_Z),
        pixel_offset: icon
            .hot_spot
            .map(|hot_spot| pixel_offset(&hot_spot, icon_size * scale)),
    }
}

/// Offset that moves the hot spot onto the anchor point. The anchor sits at
/// the icon center, with screen y pointing down.
fn pixel_offset(hot_spot: &HotSpot, size: f64) -> Cartesian2 {
    let x = match hot_spot.x_units {
        HotSpotUnits::Pixels => -hot_spot.x,
        HotSpotUnits::InsetPixels => hot_spot.x - size,
        HotSpotUnits::Fraction => -hot_spot.x * size,
    };
    let y = match hot_spot.y_units {
        HotSpotUnits::Pixels => hot_spot.y,
        HotSpotUnits::InsetPixels => -hot_spot.y,
        HotSpotUnits::Fraction => hot_spot.y * size,
    };
    Cartesian2::new(x + size / 2.0, y - size / 2.0)
}

/// Build the label for a feature named `name`.
pub fn label(style: Option<&LabelStyle>, name: Option<&str>) -> Label {
    Label {
        text: name.map(str::to_string),
        scale: style.and_then(|s| s.scale),
        color: style.and_then(|s| s.color),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon_with_hot_spot(x: f64, y: f64, units: HotSpotUnits) -> IconStyle {
        IconStyle {
            hot_spot: Some(HotSpot {
                x,
                y,
                x_units: units,
                y_units: units,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_fraction_hot_spot() {
        let b = billboard(&icon_with_hot_spot(0.25, 0.75, HotSpotUnits::Fraction), 32.0);
        assert_eq!(b.pixel_offset, Some(Cartesian2::new(8.0, 8.0)));
    }

    #[test]
    fn test_pixel_hot_spot() {
        let b = billboard(&icon_with_hot_spot(1.0, 2.0, HotSpotUnits::Pixels), 32.0);
        assert_eq!(b.pixel_offset, Some(Cartesian2::new(15.0, -14.0)));
    }

    #[test]
    fn test_inset_pixel_hot_spot() {
        let b = billboard(&icon_with_hot_spot(1.0, 2.0, HotSpotUnits::InsetPixels), 32.0);
        assert_eq!(b.pixel_offset, Some(Cartesian2::new(-15.0, -18.0)));
    }

    #[test]
    fn test_hot_spot_scales_with_icon() {
        let mut icon = icon_with_hot_spot(0.0, 0.0, HotSpotUnits::Fraction);
        icon.scale = Some(2.0);
        assert_eq!(
            billboard(&icon, 32.0).pixel_offset,
            Some(Cartesian2::new(32.0, -32.0))
        );
    }

    #[test]
    fn test_heading_rotates_about_unit_z() {
        let icon = IconStyle {
            heading: Some(4.0),
            ..Default::default()
        };
        let b = billboard(&icon, 32.0);
        assert_eq!(b.rotation, Some((-4.0f64).to_radians()));
        assert_eq!(b.aligned_axis, Some(Cartesian3::UNIT_Z));
        assert_eq!(b.pixel_offset, None);
    }

    #[test]
    fn test_label_takes_feature_name() {
        let style = LabelStyle {
            scale: Some(3.0),
            ..Default::default()
        };
        let l = label(Some(&style), Some("Pin"));
        assert_eq!(l.text.as_deref(), Some("Pin"));
        assert_eq!(l.scale, Some(3.0));
        assert_eq!(label(None, None).text, None);
    }
}
