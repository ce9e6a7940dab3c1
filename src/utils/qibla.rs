const KAABA_LAT: f64 = 21.4225;
const KAABA_LNG: f64 = 39.8262;

/// Initial great-circle bearing from (lat, lng) to the Kaaba, in degrees
/// clockwise from true north, normalised to [0, 360).
pub fn qibla_bearing(latitude: f64, longitude: f64) -> f64 {
    let lat1 = latitude.to_radians();
    let lat2 = KAABA_LAT.to_radians();
    let d_lng = (KAABA_LNG - longitude).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_bearings() {
        // Buenos Aires faces east-north-east.
        let ba = qibla_bearing(-34.6037, -58.3816);
        assert!((ba - 76.3).abs() < 1.0, "got {}", ba);

        // Riyadh sits east of Makkah, so the bearing points west.
        let riyadh = qibla_bearing(24.7136, 46.6753);
        assert!((riyadh - 243.8).abs() < 1.0, "got {}", riyadh);
    }

    #[test]
    fn bearing_stays_in_range() {
        for (lat, lng) in [(0.0, 0.0), (51.5, -0.12), (-33.9, 151.2), (64.1, -21.9)] {
            let b = qibla_bearing(lat, lng);
            assert!((0.0..360.0).contains(&b));
        }
    }
}
