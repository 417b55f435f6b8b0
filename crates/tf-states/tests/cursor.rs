//! Cursor synchronization with an instrumented phase.

mod common;

use common::{CountingPhase, InvalidPhase, h2_o2};
use tf_fluids::into_shared;
use tf_states::{Metadata, SolutionArray, StatesError};

fn counting_array(size: usize) -> (SolutionArray, std::rc::Rc<std::cell::Cell<usize>>) {
    let (phase, restores) = CountingPhase::new(h2_o2());
    let mut arr = SolutionArray::new(into_shared(phase), size, Metadata::new()).unwrap();
    arr.initialize(&[]).unwrap();
    arr.set_component("T", &vec![300.0; size], false).unwrap();
    arr.set_component("D", &vec![1.0; size], false).unwrap();
    arr.set_component("H2", &vec![1.0; size], false).unwrap();
    (arr, restores)
}

#[test]
fn repeated_index_restores_once() {
    let (mut arr, restores) = counting_array(3);
    arr.set_index(1).unwrap();
    arr.set_index(1).unwrap();
    assert_eq!(restores.get(), 1);

    arr.set_index(None).unwrap();
    assert_eq!(restores.get(), 1);

    arr.set_index(2).unwrap();
    assert_eq!(restores.get(), 2);
}

#[test]
fn reads_through_cursor_reuse_loaded_row() {
    let (mut arr, restores) = counting_array(2);
    arr.get_state(0).unwrap();
    arr.get_auxiliary(0).unwrap();
    arr.get_state(None).unwrap();
    assert_eq!(restores.get(), 1);
}

#[test]
fn initialize_unsets_cursor() {
    let (mut arr, restores) = counting_array(2);
    arr.set_index(0).unwrap();
    arr.initialize(&[]).unwrap();
    assert_eq!(arr.index(), None);
    assert!(matches!(
        arr.set_index(None),
        Err(StatesError::InvalidIndex { .. })
    ));
    arr.set_index(0).unwrap();
    assert_eq!(restores.get(), 2);
}

#[test]
fn empty_state_phase_is_rejected() {
    let err = SolutionArray::new(into_shared(InvalidPhase), 2, Metadata::new()).unwrap_err();
    assert!(matches!(err, StatesError::Configuration { .. }));
}
