//! Feature conversion: styles, geometry, time and balloon content.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use futures::executor::block_on;
use proptest::prelude::*;

use placemark::model::{
    Cartesian2, Cartographic, Color, Material, PositionProperty, PositionsProperty,
};
use placemark::{FeatureCollection, FeatureRecord, KmlDataSource, MemoryLoader};

const BASE: &str = "http://test.invalid/doc.kml";

fn convert(kml: &str) -> FeatureCollection {
    convert_with(kml, MemoryLoader::new())
}

fn convert_with(kml: &str, loader: MemoryLoader) -> FeatureCollection {
    let mut source = KmlDataSource::with_loader(Arc::new(loader));
    block_on(source.load_str(kml, Some(BASE))).unwrap().clone()
}

fn only(features: &FeatureCollection) -> &FeatureRecord {
    assert_eq!(features.len(), 1, "expected a single record");
    &features.values()[0]
}

fn placemark(body: &str) -> FeatureRecord {
    let features = convert(&format!("<kml><Placemark id='p'>{body}</Placemark></kml>"));
    only(&features).clone()
}

// Styles

#[test]
fn test_shared_style_and_style_map() {
    let features = convert(
        r#"<kml><Document>
             <Style id="red"><LineStyle><color>ff0000ff</color><width>4</width></LineStyle></Style>
             <Style id="blue"><LineStyle><color>ffff0000</color></LineStyle></Style>
             <StyleMap id="map">
               <Pair><key>normal</key><styleUrl>#red</styleUrl></Pair>
               <Pair><key>highlight</key><styleUrl>#blue</styleUrl></Pair>
             </StyleMap>
             <Placemark id="direct"><styleUrl>#red</styleUrl></Placemark>
             <Placemark id="mapped"><styleUrl>#map</styleUrl></Placemark>
           </Document></kml>"#,
    );
    let red = Some(Color::from_bytes(255, 0, 0, 255));
    for id in ["direct", "mapped"] {
        let line = features.get_by_id(id).unwrap().style.line.clone().unwrap();
        assert_eq!(line.color, red, "{id}");
        assert_eq!(line.width, Some(4.0), "{id}");
    }
}

#[test]
fn test_inline_style_overrides_shared_fields() {
    let features = convert(
        r#"<kml><Document>
             <Style id="s"><IconStyle><scale>2</scale><heading>90</heading></IconStyle></Style>
             <Placemark id="p">
               <styleUrl>#s</styleUrl>
               <Style><IconStyle><scale>3</scale></IconStyle></Style>
             </Placemark>
           </Document></kml>"#,
    );
    let icon = features.get_by_id("p").unwrap().style.icon.clone().unwrap();
    assert_eq!(icon.scale, Some(3.0));
    assert_eq!(icon.heading, Some(90.0));
}

#[test]
fn test_external_style_document() {
    let loader = MemoryLoader::new().with(
        "http://test.invalid/styles/shared.kml",
        r#"<kml><Document>
             <Style id="wide"><LineStyle><width>9</width></LineStyle></Style>
           </Document></kml>"#,
    );
    let features = convert_with(
        r#"<kml><Placemark id="p"><styleUrl>styles/shared.kml#wide</styleUrl>
             <LineString><coordinates>0,0 1,1</coordinates></LineString>
           </Placemark></kml>"#,
        loader,
    );
    let p = only(&features);
    assert_eq!(p.style.line.as_ref().unwrap().width, Some(9.0));
    assert_eq!(p.polyline().unwrap().width, Some(9.0));
}

#[test]
fn test_style_url_naming_loaded_document() {
    let loader = MemoryLoader::new().with(
        BASE,
        r##"<kml><Document>
             <Style id="s"><IconStyle><scale>2</scale></IconStyle></Style>
             <Placemark id="p"><styleUrl>doc.kml#s</styleUrl></Placemark>
           </Document></kml>"##,
    );
    let mut source = KmlDataSource::with_loader(Arc::new(loader));
    block_on(source.load_url(BASE).unwrap()).unwrap();
    let icon = source.features().get_by_id("p").unwrap().style.icon.clone();
    assert_eq!(icon.and_then(|icon| icon.scale), Some(2.0));
}

#[test]
fn test_unresolvable_style_url_is_empty_style() {
    let p = placemark("<styleUrl>missing.kml#nope</styleUrl>");
    assert!(p.style.is_empty());
}

#[test]
fn test_icon_heading_and_hot_spot() {
    let p = placemark(
        r#"<Style><IconStyle>
             <heading>90</heading>
             <hotSpot x="0.5" y="0.5" xunits="fraction" yunits="fraction"/>
           </IconStyle></Style>
           <Point><coordinates>0,0</coordinates></Point>"#,
    );
    let billboard = p.billboard.unwrap();
    assert!((billboard.rotation.unwrap() + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    assert_eq!(billboard.pixel_offset, Some(Cartesian2::new(0.0, 0.0)));
}

#[test]
fn test_label_for_named_point() {
    let p = placemark("<name>Summit</name><Point><coordinates>0,0</coordinates></Point>");
    assert_eq!(p.label.unwrap().text.as_deref(), Some("Summit"));
    assert!(p.billboard.is_some());

    let folder = convert("<kml><Folder><name>F</name></Folder></kml>");
    let folder = only(&folder);
    assert!(folder.label.is_none());
    assert!(folder.billboard.is_none());
}

// Geometry

#[test]
fn test_clamped_point_drops_height() {
    let p = placemark("<Point><coordinates>10,20,300</coordinates></Point>");
    let position = p.position().unwrap().constant().unwrap();
    assert!(position.approx_eq(&Cartographic::from_degrees(10.0, 20.0, 0.0), 1e-9));
}

#[test]
fn test_extruded_absolute_point_gets_stem() {
    let p = placemark(
        r#"<Point><extrude>1</extrude><altitudeMode>absolute</altitudeMode>
             <coordinates>10,20,300</coordinates></Point>"#,
    );
    let position = p.position().unwrap().constant().unwrap();
    assert!((position.height - 300.0).abs() < 1e-9);
    let stem = p.polyline().unwrap();
    let ends = stem.positions.constant().unwrap();
    assert_eq!(ends.len(), 2);
    assert_eq!(ends[1].height, 0.0);
    assert_eq!(stem.follow_surface, Some(false));
}

#[test]
fn test_line_string_placement() {
    let clamped = placemark(
        "<LineString><tessellate>1</tessellate><coordinates>0,0,5 1,1,5</coordinates></LineString>",
    );
    let line = clamped.polyline().unwrap();
    assert!(line.positions.constant().unwrap().iter().all(|p| p.height == 0.0));

    let raised = placemark(
        r#"<LineString><altitudeMode>relativeToGround</altitudeMode><extrude>1</extrude>
             <coordinates>0,0,5 1,1,5</coordinates></LineString>"#,
    );
    let wall = raised.wall().unwrap();
    assert_eq!(wall.minimum_heights, [0.0, 0.0]);
}

#[test]
fn test_polygon_with_hole_and_style() {
    let p = placemark(
        r#"<Style><PolyStyle><color>80ffffff</color><outline>0</outline></PolyStyle></Style>
           <Polygon>
             <outerBoundaryIs><LinearRing><coordinates>0,0 4,0 4,4 0,4 0,0</coordinates></LinearRing></outerBoundaryIs>
             <innerBoundaryIs><LinearRing><coordinates>1,1 2,1 2,2 1,1</coordinates></LinearRing></innerBoundaryIs>
           </Polygon>"#,
    );
    let polygon = p.polygon().unwrap();
    let hierarchy = polygon.hierarchy.as_ref().unwrap();
    assert_eq!(hierarchy.positions.len(), 5);
    assert_eq!(hierarchy.holes.len(), 1);
    assert_eq!(polygon.outline, Some(false));
    assert_eq!(
        polygon.material,
        Some(Material::Color(Color::from_bytes(255, 255, 255, 128)))
    );
}

#[test]
fn test_multi_geometry_concatenates() {
    let p = placemark(
        r#"<MultiGeometry>
             <Point><coordinates>0,0</coordinates></Point>
             <LineString><coordinates>0,0 1,1</coordinates></LineString>
           </MultiGeometry>"#,
    );
    assert_eq!(p.geometry.len(), 2);
}

#[test]
fn test_malformed_coordinates_degrade_to_no_geometry() {
    let p = placemark("<Point><coordinates>not numbers</coordinates></Point>");
    assert!(p.geometry.is_empty());
    assert!(p.position().is_none());
}

#[test]
fn test_ground_overlay_rectangle() {
    let features = convert(
        r#"<kml><GroundOverlay id="g">
             <color>ff00ff00</color>
             <altitude>120</altitude><altitudeMode>absolute</altitudeMode>
             <LatLonBox><north>2</north><south>1</south><east>4</east><west>3</west>
               <rotation>45</rotation></LatLonBox>
           </GroundOverlay></kml>"#,
    );
    let rectangle = only(&features).rectangle().unwrap();
    assert_eq!(rectangle.height, Some(120.0));
    assert!((rectangle.rotation.unwrap() - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    assert_eq!(
        rectangle.material,
        Some(Material::Color(Color::from_bytes(0, 255, 0, 255)))
    );
}

// Time

#[test]
fn test_time_span_availability() {
    let p = placemark("<TimeSpan><begin>2000-01-01</begin><end>2001-01-01</end></TimeSpan>");
    let availability = p.availability.unwrap();
    assert_eq!(
        availability.start(),
        Some(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap())
    );
    assert_eq!(
        availability.stop(),
        Some(Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap())
    );
}

#[test]
fn test_track_interpolates_and_sets_availability() {
    let p = placemark(
        r#"<gx:Track xmlns:gx="http://www.google.com/kml/ext/2.2">
             <when>2000-01-01T00:00:00Z</when>
             <when>2000-01-01T00:00:10Z</when>
             <gx:coord>0 0 0</gx:coord>
             <gx:coord>10 0 0</gx:coord>
           </gx:Track>"#,
    );
    let position = p.position().unwrap();
    assert!(matches!(position, PositionProperty::Sampled(_)));
    let halfway = position
        .value_at(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 5).unwrap())
        .unwrap();
    assert!((halfway.longitude_degrees() - 5.0).abs() < 1e-9);
    assert_eq!(p.availability.unwrap().len(), 1);
}

#[test]
fn test_extruded_track_stem_follows_position() {
    let p = placemark(
        r#"<gx:Track xmlns:gx="http://www.google.com/kml/ext/2.2">
             <extrude>1</extrude><altitudeMode>absolute</altitudeMode>
             <when>2000-01-01T00:00:00Z</when>
             <gx:coord>0 0 100</gx:coord>
           </gx:Track>"#,
    );
    let stem = p.polyline().unwrap();
    assert!(matches!(stem.positions, PositionsProperty::GroundAnchored(_)));
}

// Descriptions

#[test]
fn test_description_with_extended_data_and_links() {
    let p = placemark(
        r#"<description>See http://test.invalid/info.</description>
           <ExtendedData><Data name="pop"><displayName>Population</displayName><value>1 &lt; 2</value></Data></ExtendedData>"#,
    );
    let html = p.description.unwrap();
    assert!(html.starts_with(r#"<div style="word-wrap: break-word; background-color: rgb(255, 255, 255);"#));
    assert!(html.contains(
        r#"<a href="http://test.invalid/info" target="_blank">http://test.invalid/info</a>."#
    ));
    assert!(html.contains("<tr><th>Population</th><td>1 &lt; 2</td></tr>"));
}

#[test]
fn test_balloon_template_and_hidden_balloon() {
    let p = placemark(
        r#"<name>Peak</name>
           <Style><BalloonStyle><text>$[name] is $[height] m ($[missing])</text></BalloonStyle></Style>
           <ExtendedData><Data name="height"><value>4810</value></Data></ExtendedData>"#,
    );
    assert!(p.description.unwrap().contains("Peak is 4810 m ($[missing])"));

    let hidden = placemark(
        r#"<description>secret</description>
           <Style><BalloonStyle><displayMode>hide</displayMode></BalloonStyle></Style>"#,
    );
    assert!(hidden.description.is_none());
}

#[test]
fn test_no_description_without_content() {
    assert!(placemark("<name>Bare</name>").description.is_none());
}

// Identity

proptest! {
    #[test]
    fn prop_feature_ids_are_unique(ids in prop::collection::vec(
        prop::option::of(prop_oneof![
            Just("a"),
            Just("a-2"),
            Just("placemark-1"),
            Just("placemark-2"),
            Just("x"),
        ]),
        0..12,
    )) {
        let body: String = ids
            .iter()
            .map(|id| match id {
                Some(id) => format!("<Placemark id=\"{id}\"/>"),
                None => "<Placemark/>".to_string(),
            })
            .collect();
        let features = convert(&format!("<kml><Document>{body}</Document></kml>"));
        prop_assert_eq!(features.len(), ids.len());

        let mut seen = std::collections::HashSet::new();
        for record in &features {
            prop_assert!(seen.insert(record.id.clone()), "duplicate id {}", record.id);
        }
    }
}
