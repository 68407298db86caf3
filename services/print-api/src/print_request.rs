//! Outbound print request assembly.
//!
//! Normalizes caller parameters into the shape the rendering engine expects:
//! fixed GetPrint defaults, configured layer list, parcel enrichment at the
//! extent center, and re-addressing of the geometry keys to the template's
//! map frame.

use landreg_common::{Extent, LandregError, LandregResult};

use crate::print_info::{ParcelInfo, ParcelLookup, LOOKUP_SRID};

/// Name of the single map frame in the engine's print layouts. The engine's
/// templating model addresses extent/scale/rotation per frame.
pub const MAP_FRAME: &str = "map0";

/// Geometry keys required before a request is forwardable, re-addressed to
/// the map frame once consumed.
const FRAME_KEYS: [&str; 3] = ["EXTENT", "SCALE", "ROTATION"];

/// Optional geometry keys, re-addressed only when present.
const OPTIONAL_FRAME_KEYS: [&str; 2] = ["GRID_INTERVAL_X", "GRID_INTERVAL_Y"];

/// An insertion-ordered mapping of upper-cased parameter names to values.
///
/// Keys are case-normalized on every access; overwriting keeps the original
/// position, matching how the parameters are merged and forwarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrintRequest {
    entries: Vec<(String, String)>,
}

impl PrintRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a parameter. The key is upper-cased.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.insert_exact(key.to_uppercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_exact(&key.to_uppercase())
    }

    /// Lookup without case normalization, for map-frame-addressed keys.
    pub fn get_exact(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let key = key.to_uppercase();
        let idx = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Parameter pairs in insertion order, for form encoding.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    fn insert_exact(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Move a bare geometry key to its map-frame-addressed form, appended at
    /// the end. No-op when the key is absent.
    fn rename_to_frame(&mut self, key: &str) {
        if let Some(value) = self.remove(key) {
            self.insert_exact(format!("{}:{}", MAP_FRAME, key), value);
        }
    }

    fn merge_parcel_info(&mut self, info: &ParcelInfo) {
        self.set("NFGEOMETER", &info.nfgeometer);
        self.set("LIEFERDATUM", &info.lieferdatum);
        self.set("ANSCHRIFT", &info.anschrift);
        self.set("KONTAKT", &info.kontakt);
        self.set("GEMEINDE", &info.gemeinde);
    }
}

/// Builds the outbound request for one print call.
pub struct PrintRequestBuilder<'a> {
    print_layers: &'a str,
    parcel_lookup: &'a dyn ParcelLookup,
}

impl<'a> PrintRequestBuilder<'a> {
    pub fn new(print_layers: &'a str, parcel_lookup: &'a dyn ParcelLookup) -> Self {
        Self {
            print_layers,
            parcel_lookup,
        }
    }

    /// Normalize caller parameters into a forwardable print request.
    ///
    /// Caller values win over the GetPrint defaults; the configured layer
    /// list always wins over both. A parcel miss at the extent center is not
    /// an error, the print proceeds without the enrichment fields.
    pub async fn build(
        &self,
        caller_params: impl IntoIterator<Item = (String, String)>,
    ) -> LandregResult<PrintRequest> {
        let mut req = PrintRequest::new();
        req.set("SERVICE", "WMS");
        req.set("VERSION", "1.3.0");
        req.set("REQUEST", "GetPrint");
        req.set("FORMAT", "PDF");

        for (key, value) in caller_params {
            req.set(&key, value);
        }

        req.set("LAYERS", self.print_layers);
        let opacities: Vec<&str> = self.print_layers.split(',').map(|_| "255").collect();
        req.set("OPACITIES", opacities.join(","));

        for key in FRAME_KEYS {
            if req.get(key).is_none() {
                return Err(LandregError::MissingParameter(key.to_string()));
            }
        }

        let extent = Extent::from_param_string(req.get("EXTENT").unwrap_or_default()).map_err(
            |e| LandregError::MalformedParameter {
                param: "EXTENT".to_string(),
                message: e.to_string(),
            },
        )?;
        let (x, y) = extent.center();

        if let Some(info) = self.parcel_lookup.lookup(x, y, LOOKUP_SRID).await? {
            req.merge_parcel_info(&info);
        }

        for key in FRAME_KEYS {
            req.rename_to_frame(key);
        }
        for key in OPTIONAL_FRAME_KEYS {
            req.rename_to_frame(key);
        }

        Ok(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NoParcel;

    #[async_trait]
    impl ParcelLookup for NoParcel {
        async fn lookup(&self, _x: f64, _y: f64, _srid: i32) -> LandregResult<Option<ParcelInfo>> {
            Ok(None)
        }
    }

    /// Records the queried point and returns a fixed parcel row.
    struct FixedParcel {
        expect_x: f64,
        expect_y: f64,
    }

    #[async_trait]
    impl ParcelLookup for FixedParcel {
        async fn lookup(&self, x: f64, y: f64, srid: i32) -> LandregResult<Option<ParcelInfo>> {
            assert_eq!(x, self.expect_x);
            assert_eq!(y, self.expect_y);
            assert_eq!(srid, LOOKUP_SRID);
            Ok(Some(ParcelInfo {
                nfgeometer: "Muster AG".to_string(),
                lieferdatum: "2024-03-01".to_string(),
                anschrift: "Hauptstrasse 1".to_string(),
                kontakt: "info@muster.ch".to_string(),
                gemeinde: "Solothurn".to_string(),
            }))
        }
    }

    fn caller_params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // ========================================================================
    // PrintRequest map behavior
    // ========================================================================

    #[test]
    fn test_set_uppercases_and_overwrites_in_place() {
        let mut req = PrintRequest::new();
        req.set("format", "PDF");
        req.set("scale", "500");
        req.set("FORMAT", "PNG");

        assert_eq!(req.get("FORMAT"), Some("PNG"));
        assert_eq!(req.get("format"), Some("PNG"));
        // Overwrite kept the original position.
        assert_eq!(req.entries()[0], ("FORMAT".to_string(), "PNG".to_string()));
        assert_eq!(req.entries().len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut req = PrintRequest::new();
        req.set("EXTENT", "1,2,3,4");
        assert_eq!(req.remove("extent"), Some("1,2,3,4".to_string()));
        assert_eq!(req.get("EXTENT"), None);
        assert_eq!(req.remove("EXTENT"), None);
    }

    // ========================================================================
    // Builder
    // ========================================================================

    #[tokio::test]
    async fn test_build_remaps_frame_keys() {
        let lookup = NoParcel;
        let builder = PrintRequestBuilder::new("Grundstuecke", &lookup);
        let req = builder
            .build(caller_params(&[
                ("TEMPLATE", "A4-Hoch"),
                ("EXTENT", "0,0,10,10"),
                ("SCALE", "1000"),
                ("ROTATION", "0"),
            ]))
            .await
            .unwrap();

        assert_eq!(req.get_exact("map0:EXTENT"), Some("0,0,10,10"));
        assert_eq!(req.get_exact("map0:SCALE"), Some("1000"));
        assert_eq!(req.get_exact("map0:ROTATION"), Some("0"));
        assert_eq!(req.get("EXTENT"), None);
        assert_eq!(req.get("SCALE"), None);
        assert_eq!(req.get("ROTATION"), None);
    }

    #[tokio::test]
    async fn test_build_sets_defaults_and_layers() {
        let lookup = NoParcel;
        let builder = PrintRequestBuilder::new("Grundstuecke", &lookup);
        let req = builder
            .build(caller_params(&[
                ("EXTENT", "0,0,10,10"),
                ("SCALE", "1000"),
                ("ROTATION", "0"),
            ]))
            .await
            .unwrap();

        assert_eq!(req.get("SERVICE"), Some("WMS"));
        assert_eq!(req.get("VERSION"), Some("1.3.0"));
        assert_eq!(req.get("REQUEST"), Some("GetPrint"));
        assert_eq!(req.get("FORMAT"), Some("PDF"));
        assert_eq!(req.get("LAYERS"), Some("Grundstuecke"));
        assert_eq!(req.get("OPACITIES"), Some("255"));
    }

    #[tokio::test]
    async fn test_opacities_match_layer_count() {
        let lookup = NoParcel;
        let builder = PrintRequestBuilder::new("Grundstuecke,Gebaeude,Bodenbedeckung", &lookup);
        let req = builder
            .build(caller_params(&[
                ("EXTENT", "0,0,10,10"),
                ("SCALE", "1000"),
                ("ROTATION", "0"),
            ]))
            .await
            .unwrap();

        let layers = req.get("LAYERS").unwrap().split(',').count();
        let opacities: Vec<&str> = req.get("OPACITIES").unwrap().split(',').collect();
        assert_eq!(opacities.len(), layers);
        assert!(opacities.iter().all(|o| *o == "255"));
    }

    #[tokio::test]
    async fn test_caller_layers_overridden_by_configuration() {
        let lookup = NoParcel;
        let builder = PrintRequestBuilder::new("Grundstuecke", &lookup);
        let req = builder
            .build(caller_params(&[
                ("LAYERS", "SomethingElse"),
                ("EXTENT", "0,0,10,10"),
                ("SCALE", "1000"),
                ("ROTATION", "0"),
            ]))
            .await
            .unwrap();

        assert_eq!(req.get("LAYERS"), Some("Grundstuecke"));
    }

    #[tokio::test]
    async fn test_caller_overrides_defaults() {
        let lookup = NoParcel;
        let builder = PrintRequestBuilder::new("Grundstuecke", &lookup);
        let req = builder
            .build(caller_params(&[
                ("format", "PNG"),
                ("EXTENT", "0,0,10,10"),
                ("SCALE", "1000"),
                ("ROTATION", "0"),
            ]))
            .await
            .unwrap();

        assert_eq!(req.get("FORMAT"), Some("PNG"));
    }

    #[tokio::test]
    async fn test_missing_scale_fails() {
        let lookup = NoParcel;
        let builder = PrintRequestBuilder::new("Grundstuecke", &lookup);
        let err = builder
            .build(caller_params(&[("EXTENT", "0,0,10,10"), ("ROTATION", "0")]))
            .await
            .unwrap_err();

        assert!(matches!(err, LandregError::MissingParameter(ref p) if p == "SCALE"));
    }

    #[tokio::test]
    async fn test_malformed_extent_fails() {
        let lookup = NoParcel;
        let builder = PrintRequestBuilder::new("Grundstuecke", &lookup);
        let err = builder
            .build(caller_params(&[
                ("EXTENT", "0,0,10"),
                ("SCALE", "1000"),
                ("ROTATION", "0"),
            ]))
            .await
            .unwrap_err();

        assert!(matches!(err, LandregError::MalformedParameter { ref param, .. } if param == "EXTENT"));
    }

    #[tokio::test]
    async fn test_parcel_enrichment_at_extent_center() {
        let lookup = FixedParcel {
            expect_x: 2605000.0,
            expect_y: 1205000.0,
        };
        let builder = PrintRequestBuilder::new("Grundstuecke", &lookup);
        let req = builder
            .build(caller_params(&[
                ("EXTENT", "2600000,1200000,2610000,1210000"),
                ("SCALE", "1000"),
                ("ROTATION", "0"),
            ]))
            .await
            .unwrap();

        assert_eq!(req.get("NFGEOMETER"), Some("Muster AG"));
        assert_eq!(req.get("LIEFERDATUM"), Some("2024-03-01"));
        assert_eq!(req.get("ANSCHRIFT"), Some("Hauptstrasse 1"));
        assert_eq!(req.get("KONTAKT"), Some("info@muster.ch"));
        assert_eq!(req.get("GEMEINDE"), Some("Solothurn"));
    }

    #[tokio::test]
    async fn test_no_parcel_match_is_not_an_error() {
        let lookup = NoParcel;
        let builder = PrintRequestBuilder::new("Grundstuecke", &lookup);
        let req = builder
            .build(caller_params(&[
                ("EXTENT", "0,0,10,10"),
                ("SCALE", "1000"),
                ("ROTATION", "0"),
            ]))
            .await
            .unwrap();

        assert_eq!(req.get("NFGEOMETER"), None);
        assert_eq!(req.get("GEMEINDE"), None);
    }

    #[tokio::test]
    async fn test_grid_intervals_remapped_when_present() {
        let lookup = NoParcel;
        let builder = PrintRequestBuilder::new("Grundstuecke", &lookup);
        let req = builder
            .build(caller_params(&[
                ("EXTENT", "0,0,10,10"),
                ("SCALE", "1000"),
                ("ROTATION", "0"),
                ("GRID_INTERVAL_X", "100"),
                ("GRID_INTERVAL_Y", "50"),
            ]))
            .await
            .unwrap();

        assert_eq!(req.get_exact("map0:GRID_INTERVAL_X"), Some("100"));
        assert_eq!(req.get_exact("map0:GRID_INTERVAL_Y"), Some("50"));
        assert_eq!(req.get("GRID_INTERVAL_X"), None);
        assert_eq!(req.get("GRID_INTERVAL_Y"), None);
    }

    #[tokio::test]
    async fn test_grid_intervals_absent_stay_absent() {
        let lookup = NoParcel;
        let builder = PrintRequestBuilder::new("Grundstuecke", &lookup);
        let req = builder
            .build(caller_params(&[
                ("EXTENT", "0,0,10,10"),
                ("SCALE", "1000"),
                ("ROTATION", "0"),
            ]))
            .await
            .unwrap();

        assert_eq!(req.get_exact("map0:GRID_INTERVAL_X"), None);
        assert_eq!(req.get_exact("map0:GRID_INTERVAL_Y"), None);
    }
}
