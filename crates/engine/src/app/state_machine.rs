use thiserror::Error;
use tracing::trace;

pub type StateId = &'static str;

pub trait State<C> {
    fn id(&self) -> StateId;
    fn on_enter(&mut self, _context: &mut C) {}
    fn on_exit(&mut self, _context: &mut C) {}
    fn update(&mut self, context: &mut C);
}

pub struct Transition<C> {
    pub from: StateId,
    pub to: StateId,
    pub condition: fn(&C) -> bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateMachineError {
    #[error("state '{0}' is already registered")]
    DuplicateState(StateId),
    #[error("transition references unknown state '{0}'")]
    UnknownState(StateId),
}

/// Finite-state machine over a context owned by the machine.
///
/// Per `update`: the current state is entered if it has not been yet, the
/// first transition out of it whose condition holds is taken, then the
/// (possibly new) current state is updated.
pub struct StateMachine<C> {
    context: C,
    states: Vec<Box<dyn State<C>>>,
    transitions: Vec<Transition<C>>,
    current: usize,
    entered: bool,
}

impl<C> StateMachine<C> {
    pub fn new(context: C, initial: Box<dyn State<C>>) -> Self {
        Self {
            context,
            states: vec![initial],
            transitions: Vec::new(),
            current: 0,
            entered: false,
        }
    }

    pub fn add_state(&mut self, state: Box<dyn State<C>>) -> Result<(), StateMachineError> {
        let id = state.id();
        if self.index_of(id).is_some() {
            return Err(StateMachineError::DuplicateState(id));
        }
        self.states.push(state);
        Ok(())
    }

    pub fn add_transition(&mut self, transition: Transition<C>) -> Result<(), StateMachineError> {
        for id in [transition.from, transition.to] {
            if self.index_of(id).is_none() {
                return Err(StateMachineError::UnknownState(id));
            }
        }
        self.transitions.push(transition);
        Ok(())
    }

    pub fn update(&mut self) {
        if !self.entered {
            self.entered = true;
            self.states[self.current].on_enter(&mut self.context);
        }

        let current_id = self.current_state_id();
        let next = self
            .transitions
            .iter()
            .find(|transition| transition.from == current_id && (transition.condition)(&self.context))
            .and_then(|transition| self.index_of(transition.to));
        if let Some(next) = next {
            trace!(
                from = current_id,
                to = self.states[next].id(),
                "state_transition"
            );
            self.states[self.current].on_exit(&mut self.context);
            self.current = next;
            self.states[self.current].on_enter(&mut self.context);
        }

        self.states[self.current].update(&mut self.context);
    }

    pub fn current_state_id(&self) -> StateId {
        self.states[self.current].id()
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    fn index_of(&self, id: StateId) -> Option<usize> {
        self.states.iter().position(|state| state.id() == id)
    }
}
