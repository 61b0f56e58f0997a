use ncsim_core::Strategy;
use ncsim_math::{Field, GfElement};
use ncsim_rlnc::{CoefficientDraw, CoefficientStrategy, RlncDecoder, RlncEncoder, DEFAULT_INCLUDE_PROBABILITY};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn setup(k: usize) -> (RlncEncoder, RlncDecoder) {
    let data: Vec<u8> = (0..k as u8 * 2).collect();
    let enc = RlncEncoder::new(Field::Binary8, k, 2, data).unwrap();
    let dec = RlncDecoder::new(Field::Binary8, k, 2);
    (enc, dec)
}

#[test]
fn test_draw_stays_in_active_range() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for field in [Field::Binary, Field::Binary4, Field::Binary8, Field::Binary16] {
        let draw = CoefficientDraw::sample(field, 64, &mut rng);
        assert_eq!(draw.values().len(), 64);
        assert!(draw.values().iter().all(|v| !v.is_zero() && field.contains(*v)));
    }
}

#[test]
fn test_empty_pivot_set_gives_zero_vector() {
    let (enc, dec) = setup(4);
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let draw = CoefficientDraw::sample(Field::Binary8, 4, &mut rng);

    for strategy in [
        CoefficientStrategy::Simple { include_probability: 1.0 },
        CoefficientStrategy::Greedy,
        CoefficientStrategy::Heuristic,
    ] {
        let pkt = strategy.build_packet(0, &enc, &dec, &draw, &mut rng).unwrap();
        assert!(pkt.is_empty());
        assert_eq!(pkt.payload, vec![0, 0]);
    }
}

#[test]
fn test_greedy_uses_every_pivot() {
    let (enc, mut dec) = setup(4);
    dec.consume_systematic(1, enc.symbol(1).unwrap()).unwrap();
    dec.consume_systematic(3, enc.symbol(3).unwrap()).unwrap();

    let draw = CoefficientDraw::from_values(vec![GfElement(5), GfElement(6), GfElement(7), GfElement(8)]);
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let coeffs = CoefficientStrategy::Greedy.select(&dec, &draw, &mut rng);
    assert_eq!(coeffs, vec![GfElement::ZERO, GfElement(6), GfElement::ZERO, GfElement(8)]);

    let heuristic = CoefficientStrategy::Heuristic.select(&dec, &draw, &mut rng);
    assert_eq!(heuristic, coeffs);
}

#[test]
fn test_simple_sparsity_bounds() {
    let (enc, mut dec) = setup(3);
    for i in 0..3 {
        dec.consume_systematic(i, enc.symbol(i).unwrap()).unwrap();
    }
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let draw = CoefficientDraw::sample(Field::Binary8, 3, &mut rng);

    let never = CoefficientStrategy::Simple { include_probability: 0.0 };
    assert!(never.select(&dec, &draw, &mut rng).iter().all(|c| c.is_zero()));

    let always = CoefficientStrategy::Simple { include_probability: 1.0 };
    assert_eq!(always.select(&dec, &draw, &mut rng), draw.values().to_vec());
}

#[test]
fn test_simple_default_density_is_about_half() {
    let (enc, mut dec) = setup(8);
    for i in 0..8 {
        dec.consume_systematic(i, enc.symbol(i).unwrap()).unwrap();
    }
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let simple = CoefficientStrategy::Simple { include_probability: DEFAULT_INCLUDE_PROBABILITY };

    let mut kept = 0;
    for _ in 0..500 {
        let draw = CoefficientDraw::sample(Field::Binary8, 8, &mut rng);
        kept += simple.select(&dec, &draw, &mut rng).iter().filter(|c| !c.is_zero()).count();
    }
    let ratio = kept as f64 / 4000.0;
    assert!((0.45..0.55).contains(&ratio), "density {}", ratio);
}

#[test]
fn test_packet_overhead() {
    let coeffs = vec![GfElement(1), GfElement::ZERO, GfElement(9)];
    let f = Field::Binary4;
    assert_eq!(CoefficientStrategy::Simple { include_probability: 0.5 }.packet_overhead(f, &coeffs), 8);
    assert_eq!(CoefficientStrategy::Greedy.packet_overhead(f, &coeffs), 8);
    assert_eq!(CoefficientStrategy::Heuristic.packet_overhead(f, &coeffs), 17);
}

#[test]
fn test_heuristic_packet_carries_done_flag() {
    let (enc, mut dec) = setup(2);
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    dec.consume_systematic(0, enc.symbol(0).unwrap()).unwrap();
    let draw = CoefficientDraw::sample(Field::Binary8, 2, &mut rng);

    let pkt = CoefficientStrategy::Heuristic.build_packet(0, &enc, &dec, &draw, &mut rng).unwrap();
    assert_eq!(pkt.strategy, Strategy::Heuristic);
    assert_eq!(pkt.done, Some(false));
    assert_eq!(CoefficientStrategy::Heuristic.packet_overhead(Field::Binary8, &pkt.coefficients), 8 + 9);

    dec.consume_systematic(1, enc.symbol(1).unwrap()).unwrap();
    let pkt = CoefficientStrategy::Heuristic.build_packet(0, &enc, &dec, &draw, &mut rng).unwrap();
    assert_eq!(pkt.done, Some(true));

    let greedy = CoefficientStrategy::Greedy.build_packet(0, &enc, &dec, &draw, &mut rng).unwrap();
    assert_eq!(greedy.done, None);
    assert_eq!(greedy.payload, enc.encode(&greedy.coefficients).unwrap());
}
