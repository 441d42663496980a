// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ink descriptors, separation sets, and spot selection.

use rasterwerk_core::error::{RasterError, Result};
use rasterwerk_core::types::ColorSpace;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One colorant: a name plus its representation in an alternate space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InkDef")]
pub struct Ink {
    name: String,
    representation: Vec<f32>,
    target_space: ColorSpace,
}

/// Unvalidated wire form of an [`Ink`].
#[derive(Deserialize)]
struct InkDef {
    name: String,
    representation: Vec<f32>,
    target_space: ColorSpace,
}

impl TryFrom<InkDef> for Ink {
    type Error = RasterError;

    fn try_from(def: InkDef) -> Result<Self> {
        Ink::new(def.name, def.representation, def.target_space)
    }
}

impl Ink {
    /// Define an ink. The representation needs one finite value per
    /// component of `target_space`.
    pub fn new(
        name: impl Into<String>,
        representation: Vec<f32>,
        target_space: ColorSpace,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(RasterError::InvalidInk("ink name is empty".into()));
        }
        if representation.len() != target_space.num_components() {
            return Err(RasterError::InvalidInk(format!(
                "{name}: {} components given, {target_space} has {}",
                representation.len(),
                target_space.num_components()
            )));
        }
        if representation.iter().any(|v| !v.is_finite()) {
            return Err(RasterError::InvalidInk(format!(
                "{name}: representation contains a non-finite value"
            )));
        }
        Ok(Self {
            name,
            representation,
            target_space,
        })
    }

    /// The process inks of `space`, each represented by its own unit vector.
    pub fn process_inks(space: &ColorSpace) -> Vec<Ink> {
        let count = space.num_components();
        space
            .colorant_names()
            .into_iter()
            .enumerate()
            .map(|(index, name)| {
                let mut representation = vec![0.0; count];
                representation[index] = 1.0;
                Self {
                    name,
                    representation,
                    target_space: space.clone(),
                }
            })
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn representation(&self) -> &[f32] {
        &self.representation
    }

    pub fn target_space(&self) -> &ColorSpace {
        &self.target_space
    }
}

/// Process inks followed by retained spot inks, in plane order.
///
/// Spot order decides plane order only; the blend result does not depend
/// on it.
#[derive(Debug, Clone, PartialEq)]
pub struct SeparationSet {
    process_space: ColorSpace,
    inks: Vec<Ink>,
}

impl SeparationSet {
    /// Build a set. Every spot must be represented in `process_space` so it
    /// can later be merged onto the process planes.
    pub fn new(process_space: ColorSpace, spots: Vec<Ink>) -> Result<Self> {
        let mut inks = Ink::process_inks(&process_space);
        for spot in spots {
            if spot.target_space != process_space {
                return Err(RasterError::InvalidInk(format!(
                    "{}: represented in {}, expected {process_space}",
                    spot.name, spot.target_space
                )));
            }
            if inks.iter().any(|ink| ink.name == spot.name) {
                return Err(RasterError::InvalidInk(format!(
                    "{}: listed more than once",
                    spot.name
                )));
            }
            inks.push(spot);
        }
        Ok(Self {
            process_space,
            inks,
        })
    }

    pub fn process_space(&self) -> &ColorSpace {
        &self.process_space
    }

    pub fn process_count(&self) -> usize {
        self.process_space.num_components()
    }

    pub fn len(&self) -> usize {
        self.inks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inks.is_empty()
    }

    pub fn inks(&self) -> &[Ink] {
        &self.inks
    }

    pub fn process_inks(&self) -> &[Ink] {
        &self.inks[..self.process_count()]
    }

    pub fn spot_inks(&self) -> &[Ink] {
        &self.inks[self.process_count()..]
    }

    pub fn names(&self) -> Vec<&str> {
        self.inks.iter().map(Ink::name).collect()
    }

    /// Spot representations in plane order, for the compositor.
    pub fn spot_representations(&self) -> Vec<Vec<f32>> {
        self.spot_inks()
            .iter()
            .map(|ink| ink.representation.clone())
            .collect()
    }
}

/// Which spot inks get their own plane.
///
/// Spots named in `ignore` do not paint at all. Spots named in `retain` get
/// a plane. With an empty `retain` list every spot not ignored is retained.
/// Spots in neither list are painted through their process equivalent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InkSelection {
    #[serde(default)]
    pub retain: Vec<String>,
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// Outcome of applying an [`InkSelection`] to a page's ink inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInks {
    pub retained: Vec<Ink>,
    pub ignored: Vec<String>,
    pub converted: Vec<String>,
}

impl InkSelection {
    /// Retain every spot on the page.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(retain: Vec<String>, ignore: Vec<String>) -> Self {
        Self { retain, ignore }
    }

    /// Split `inventory` into retained, ignored and converted spots.
    ///
    /// Fails with `UnknownInk` if either list names an ink the page does not
    /// use. A spot in both lists is ignored.
    pub fn resolve(&self, inventory: &[Ink]) -> Result<ResolvedInks> {
        for name in self.retain.iter().chain(&self.ignore) {
            if !inventory.iter().any(|ink| ink.name() == name) {
                return Err(RasterError::UnknownInk(name.clone()));
            }
        }

        let mut resolved = ResolvedInks {
            retained: Vec::new(),
            ignored: Vec::new(),
            converted: Vec::new(),
        };
        for ink in inventory {
            let name = ink.name().to_owned();
            if self.ignore.contains(&name) {
                resolved.ignored.push(name);
            } else if self.retain.is_empty() || self.retain.contains(&name) {
                resolved.retained.push(ink.clone());
            } else {
                resolved.converted.push(name);
            }
        }
        debug!(
            retained = resolved.retained.len(),
            ignored = resolved.ignored.len(),
            converted = resolved.converted.len(),
            "Ink selection resolved"
        );
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot(name: &str, cmyk: [f32; 4]) -> Ink {
        Ink::new(name, cmyk.to_vec(), ColorSpace::DeviceCmyk).unwrap()
    }

    #[test]
    fn representation_length_must_match_space() {
        let err = Ink::new("Rubine", vec![43.92, 79.0], ColorSpace::Lab).unwrap_err();
        assert!(matches!(err, RasterError::InvalidInk(_)));
        assert!(Ink::new("Rubine", vec![43.92, 79.0, 13.0], ColorSpace::Lab).is_ok());
    }

    #[test]
    fn set_puts_process_first() {
        let set = SeparationSet::new(
            ColorSpace::DeviceCmyk,
            vec![spot("Orange", [0.0, 0.6, 1.0, 0.0]), spot("Green", [0.9, 0.0, 0.9, 0.0])],
        )
        .unwrap();
        assert_eq!(
            set.names(),
            ["Cyan", "Magenta", "Yellow", "Black", "Orange", "Green"]
        );
        assert_eq!(set.process_inks()[1].representation(), &[0.0, 1.0, 0.0, 0.0]);
        assert_eq!(set.spot_representations()[0], vec![0.0, 0.6, 1.0, 0.0]);
    }

    #[test]
    fn set_rejects_foreign_space_and_duplicates() {
        let lab = Ink::new("Rubine", vec![43.92, 79.0, 13.0], ColorSpace::Lab).unwrap();
        assert!(SeparationSet::new(ColorSpace::DeviceCmyk, vec![lab]).is_err());
        let dup = spot("Cyan", [1.0, 0.0, 0.0, 0.0]);
        assert!(SeparationSet::new(ColorSpace::DeviceCmyk, vec![dup]).is_err());
    }

    #[test]
    fn selection_splits_inventory() {
        let inventory = vec![
            spot("Orange", [0.0, 0.6, 1.0, 0.0]),
            spot("Green", [0.9, 0.0, 0.9, 0.0]),
            spot("Varnish", [0.0, 0.0, 0.0, 0.0]),
        ];
        let selection = InkSelection::new(vec!["Orange".into()], vec!["Varnish".into()]);
        let resolved = selection.resolve(&inventory).unwrap();
        assert_eq!(resolved.retained.len(), 1);
        assert_eq!(resolved.retained[0].name(), "Orange");
        assert_eq!(resolved.ignored, ["Varnish"]);
        assert_eq!(resolved.converted, ["Green"]);

        let everything = InkSelection::all().resolve(&inventory).unwrap();
        assert_eq!(everything.retained.len(), 3);
    }

    #[test]
    fn unknown_ink_is_reported() {
        let inventory = vec![spot("Orange", [0.0, 0.6, 1.0, 0.0])];
        let selection = InkSelection::new(vec!["Reflex Blue".into()], vec![]);
        let err = selection.resolve(&inventory).unwrap_err();
        assert!(matches!(err, RasterError::UnknownInk(name) if name == "Reflex Blue"));
    }

    #[test]
    fn ink_deserialisation_validates() {
        let json = r#"{"name":"Orange","representation":[0.0,0.6],"target_space":{"type":"device_cmyk"}}"#;
        assert!(serde_json::from_str::<Ink>(json).is_err());
    }
}
