//! Point-in-region test against the fixed PAR boundary polygon.

/// Philippine Area of Responsibility boundary, vertices as (lon, lat).
/// Ordered, simple, not closed (the last edge wraps to the first vertex).
const PAR_POLYGON: [(f64, f64); 6] = [
    (115.0, 5.0),
    (115.0, 15.0),
    (120.0, 21.0),
    (120.0, 25.0),
    (135.0, 25.0),
    (135.0, 5.0),
];

const EDGE_EPS: f64 = 1e-9;

/// Boundary-inclusive test for whether a fix position lies inside the PAR.
///
/// `None` coordinates are treated as outside. A point exactly on a polygon
/// edge or vertex counts as inside, checked before the parity test.
pub fn is_inside_region(lat: Option<f64>, lon: Option<f64>) -> bool {
    let (Some(lat), Some(lon)) = (lat, lon) else {
        return false;
    };

    let n = PAR_POLYGON.len();
    for i in 0..n {
        let a = PAR_POLYGON[i];
        let b = PAR_POLYGON[(i + 1) % n];
        if on_segment((lon, lat), a, b) {
            return true;
        }
    }

    // Even-odd ray cast toward +longitude, half-open edge inclusion so a
    // ray through a vertex is not counted twice.
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = PAR_POLYGON[i];
        let (xj, yj) = PAR_POLYGON[j];
        if (yi > lat) != (yj > lat) {
            let x_cross = (xj - xi) * (lat - yi) / (yj - yi) + xi;
            if lon < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn on_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> bool {
    let (px, py) = p;
    let (ax, ay) = a;
    let (bx, by) = b;

    let cross = (bx - ax) * (py - ay) - (by - ay) * (px - ax);
    if cross.abs() > EDGE_EPS {
        return false;
    }

    // Projection of p onto ab must fall within the segment.
    let dot = (px - ax) * (bx - ax) + (py - ay) * (by - ay);
    let len_sq = (bx - ax) * (bx - ax) + (by - ay) * (by - ay);
    dot >= -EDGE_EPS && dot <= len_sq + EDGE_EPS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_point() {
        assert!(is_inside_region(Some(14.0), Some(125.0)));
    }

    #[test]
    fn test_exterior_point() {
        assert!(!is_inside_region(Some(14.0), Some(140.0)));
        assert!(!is_inside_region(Some(30.0), Some(125.0)));
    }

    #[test]
    fn test_vertex_counts_as_inside() {
        assert!(is_inside_region(Some(5.0), Some(115.0)));
        assert!(is_inside_region(Some(25.0), Some(135.0)));
    }

    #[test]
    fn test_edge_counts_as_inside() {
        // Midpoint of the eastern boundary (135E, 5N..25N)
        assert!(is_inside_region(Some(15.0), Some(135.0)));
        // Point on the slanted segment (115,15)-(120,21): lon 117.5, lat 18
        assert!(is_inside_region(Some(18.0), Some(117.5)));
    }

    #[test]
    fn test_epsilon_outside_edge() {
        assert!(!is_inside_region(Some(15.0), Some(135.0 + 1e-6)));
        assert!(!is_inside_region(Some(5.0 - 1e-6), Some(125.0)));
    }

    #[test]
    fn test_null_coordinates_are_outside() {
        assert!(!is_inside_region(None, Some(125.0)));
        assert!(!is_inside_region(Some(14.0), None));
        assert!(!is_inside_region(None, None));
    }
}
