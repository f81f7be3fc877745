use alkalinity_rs::density::eos80::{t68_from_t90, t90_from_t68};
use alkalinity_rs::{
    CalcError, pure_water_density, pure_water_density_all, seawater_density, seawater_density_all,
};

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "{a} != {b} (tol {tol})");
}

#[test]
fn unesco_table_values() {
    // UNESCO Tech. Paper in Marine Sci. No. 44, p22: T68 inputs 0, 0, 30, 30.
    let t90: Vec<f64> = [0.0, 0.0, 30.0, 30.0].iter().map(|&t| t90_from_t68(t)).collect();
    let rho = pure_water_density_all(&t90);
    approx_eq(rho[0], 999.842_594, 1e-9);
    approx_eq(rho[1], 999.842_594, 1e-9);
    approx_eq(rho[2], 995.651_133_74, 1e-7);
    approx_eq(rho[3], 995.651_133_74, 1e-7);
}

#[test]
fn temperature_scale_round_trip() {
    approx_eq(t68_from_t90(30.0), 30.0072, 1e-12);
    approx_eq(t90_from_t68(t68_from_t90(12.5)), 12.5, 1e-12);
}

#[test]
fn fresh_water_limit_matches_pure_water() {
    for i in 0..=84 {
        let t = -2.0 + 0.5 * i as f64;
        let sw = seawater_density(0.0, t).unwrap();
        approx_eq(sw, pure_water_density(t) / 1000.0, 1e-9);
    }
}

#[test]
fn standard_seawater_density() {
    approx_eq(seawater_density(35.0, 20.0).unwrap() * 1000.0, 1024.7617, 1e-3);
    approx_eq(seawater_density(35.0, 25.0).unwrap(), 1.023_341, 1e-6);
}

#[test]
fn element_wise_shapes() {
    let s = [0.0, 10.0, 20.0, 30.0, 40.0];
    let out = seawater_density_all(&s, &[15.0]).unwrap();
    assert_eq!(out.len(), s.len());
    assert!(out.windows(2).all(|w| w[1] > w[0]));

    assert_eq!(
        seawater_density_all(&s, &[15.0, 16.0]).unwrap_err(),
        CalcError::ShapeMismatch { left: 5, right: 2 }
    );
}

#[test]
fn negative_salinity_is_rejected_not_nan() {
    let err = seawater_density(-1.0, 10.0).unwrap_err();
    assert!(matches!(err, CalcError::Domain(_)));
    assert!(err.to_string().contains("salinity"));

    assert!(matches!(
        seawater_density_all(&[35.0, -0.01], &[10.0]),
        Err(CalcError::Domain(_))
    ));
}
