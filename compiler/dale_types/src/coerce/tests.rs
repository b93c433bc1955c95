use super::*;

#[test]
fn exact() {
    let pool = Pool::new();
    assert_eq!(coercion_rank(&pool, Idx::INT, Idx::INT), Some(CoercionRank::Exact));
}

#[test]
fn qualification() {
    let mut pool = Pool::new();
    let p = pool.pointer(Idx::INT);
    let pc = pool.const_pointer(Idx::INT);
    let pv = pool.pointer(Idx::VOID);
    let pcv = pool.const_pointer(Idx::VOID);
    let r = pool.reference(Idx::INT);

    assert_eq!(coercion_rank(&pool, p, pc), Some(CoercionRank::Qualification));
    assert_eq!(coercion_rank(&pool, p, pv), Some(CoercionRank::Qualification));
    assert_eq!(coercion_rank(&pool, pc, pcv), Some(CoercionRank::Qualification));
    assert_eq!(coercion_rank(&pool, Idx::INT, r), Some(CoercionRank::Qualification));

    // Dropping const is never implicit.
    assert_eq!(coercion_rank(&pool, pc, p), None);
    assert_eq!(coercion_rank(&pool, pc, pv), None);
}

#[test]
fn promotion() {
    let pool = Pool::new();
    assert_eq!(coercion_rank(&pool, Idx::INT8, Idx::INT), Some(CoercionRank::Promotion));
    assert_eq!(coercion_rank(&pool, Idx::UINT8, Idx::UINT64), Some(CoercionRank::Promotion));
    assert_eq!(coercion_rank(&pool, Idx::CHAR, Idx::INT16), Some(CoercionRank::Promotion));
    assert_eq!(coercion_rank(&pool, Idx::FLOAT, Idx::DOUBLE), Some(CoercionRank::Promotion));
    assert_eq!(coercion_rank(&pool, Idx::BOOL, Idx::INT), Some(CoercionRank::Promotion));
}

#[test]
fn narrowing_is_rejected() {
    let pool = Pool::new();
    assert_eq!(coercion_rank(&pool, Idx::INT, Idx::INT8), None);
    assert_eq!(coercion_rank(&pool, Idx::DOUBLE, Idx::FLOAT), None);
    assert_eq!(coercion_rank(&pool, Idx::INT, Idx::BOOL), None);
    assert_eq!(coercion_rank(&pool, Idx::INT, Idx::UINT64), None);
}

#[test]
fn sign_change() {
    let pool = Pool::new();
    assert_eq!(coercion_rank(&pool, Idx::UINT8, Idx::INT), Some(CoercionRank::SignChange));
    assert_eq!(coercion_rank(&pool, Idx::UINT, Idx::INT), None);
}

#[test]
fn int_to_float() {
    let pool = Pool::new();
    assert_eq!(coercion_rank(&pool, Idx::INT16, Idx::FLOAT), Some(CoercionRank::IntToFloat));
    assert_eq!(coercion_rank(&pool, Idx::INT, Idx::DOUBLE), Some(CoercionRank::IntToFloat));
    assert_eq!(coercion_rank(&pool, Idx::INT, Idx::FLOAT), None);
    assert_eq!(coercion_rank(&pool, Idx::INT64, Idx::DOUBLE), None);
}

#[test]
fn ranks_are_totally_ordered() {
    let ranks = [
        CoercionRank::Exact,
        CoercionRank::Qualification,
        CoercionRank::Promotion,
        CoercionRank::SignChange,
        CoercionRank::IntToFloat,
        CoercionRank::Generic,
        CoercionRank::Variadic,
    ];
    for (i, pair) in ranks.windows(2).enumerate() {
        assert!(pair[0] < pair[1]);
        assert_eq!(pair[0].cost(), i as u32);
    }
}
