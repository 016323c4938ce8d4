//! Round trips through the reversible primitives.

use peregrine_solver::containers::RevBitMatrix;
use peregrine_solver::containers::RevFifo;
use peregrine_solver::containers::RevMultiMap;
use peregrine_solver::state::RevSwitch;
use peregrine_solver::state::TrailedValues;

#[test]
fn a_cell_round_trips_through_two_writes() {
    let mut trailed = TrailedValues::default();
    let cell = trailed.grow(7);

    trailed.push_level();
    trailed.assign(cell, 9);
    trailed.assign(cell, 11);
    assert_eq!(trailed.read(cell), 11);

    trailed.undo_to(0);
    assert_eq!(trailed.read(cell), 7);
}

#[test]
fn fifo_iteration_is_newest_first_and_survives_partial_undo() {
    let mut trailed = TrailedValues::default();
    let mut fifo = RevFifo::new(&mut trailed);

    for value in 0..20 {
        fifo.push(&mut trailed, value);
    }
    trailed.push_level();
    for value in 20..34 {
        fifo.push(&mut trailed, value);
    }

    let newest_first = fifo.iter(&trailed).collect::<Vec<_>>();
    assert_eq!(newest_first, (0..34).rev().collect::<Vec<_>>());

    trailed.undo_to(0);
    let after_undo = fifo.iter(&trailed).collect::<Vec<_>>();
    assert_eq!(after_undo, (0..20).rev().collect::<Vec<_>>());
}

#[test]
fn a_switch_flips_once_and_resets_on_undo() {
    let mut trailed = TrailedValues::default();
    let switch = RevSwitch::new(&mut trailed);

    trailed.push_level();
    switch.switch(&mut trailed);
    switch.switch(&mut trailed);
    assert!(switch.switched(&trailed));

    trailed.undo_to(0);
    assert!(!switch.switched(&trailed));
}

#[test]
fn multimap_insertions_and_rehashes_unwind() {
    let mut trailed = TrailedValues::default();
    let mut map = RevMultiMap::new(&mut trailed, 2);
    map.insert(&mut trailed, "root", 1i64);

    trailed.push_level();
    for value in 0..16 {
        map.insert(&mut trailed, "search", value);
    }
    assert!(map.contains_key(&trailed, &"search"));
    assert_eq!(map.num_items(&trailed), 17);

    trailed.undo_to(0);
    assert_eq!(map.num_items(&trailed), 1);
    assert!(map.contains_key(&trailed, &"root"));
    assert!(!map.contains_key(&trailed, &"search"));
}

#[test]
fn bit_matrix_rows_unwind_independently() {
    let mut trailed = TrailedValues::default();
    let mut matrix = RevBitMatrix::new(&mut trailed, 4, 100);

    matrix.set(&mut trailed, 0, 99);

    trailed.push_level();
    matrix.set(&mut trailed, 1, 5);
    matrix.set(&mut trailed, 3, 64);
    matrix.clear(&mut trailed, 0, 99);
    assert!(!matrix.contains(&trailed, 0, 99));

    trailed.undo_to(0);
    assert!(matrix.contains(&trailed, 0, 99));
    assert_eq!(matrix.cardinality(&trailed, 1), 0);
    assert_eq!(matrix.cardinality(&trailed, 3), 0);
}
