//! Registry of the fixed coastal monitoring stations where casts are taken.
//!
//! The latitude is what the equation-of-state step needs to convert sea
//! pressure to depth with local gravity.

use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy)]
pub struct Station {
    pub id: u32,
    pub name: &'static str,
    pub latitude: f64,
}

static STATIONS: Lazy<Vec<Station>> = Lazy::new(|| {
    vec![
        Station { id: 1, name: "Wimereux", latitude: 50.6875 },
        Station { id: 3, name: "Roscoff", latitude: 48.7778 },
        Station { id: 5, name: "Brest", latitude: 48.3589 },
        Station { id: 6, name: "Arcachon", latitude: 44.6641 },
        Station { id: 7, name: "Gironde", latitude: 45.5167 },
        Station { id: 10, name: "Banyuls", latitude: 42.4883 },
        Station { id: 11, name: "Marseille", latitude: 43.2417 },
        Station { id: 12, name: "Villefranche", latitude: 43.6833 },
        Station { id: 17, name: "Luc-sur-Mer", latitude: 49.3188 },
        Station { id: 18, name: "La Rochelle", latitude: 46.0842 },
        Station { id: 19, name: "Dinard", latitude: 48.6333 },
        Station { id: 22, name: "Sete", latitude: 43.3267 },
    ]
});

pub fn station(id: u32) -> Option<&'static Station> {
    STATIONS.iter().find(|station| station.id == id)
}

pub fn all_stations() -> &'static [Station] {
    STATIONS.as_slice()
}
