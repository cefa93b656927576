//! Spec definitions: the declared phase operations of one scenario, and how to build them.
//!
//! A spec is a type `S` (the subject) plus an ordered list of [`PhaseOperation`]s over `&mut S`. Two
//! ways produce one:
//!
//! - implement [`Spec`] (usually through the `#[spec]` attribute) and call [`SpecDefinition::of`]
//! - chain closures on a [`SpecBuilder`]
//!
//! Either way the result is a type-erased, cheaply clonable [`SpecDefinition`]. Each execution asks it
//! for a fresh instance, so no state leaks between runs of the same definition.

use std::fmt;
use std::rc::Rc;

use phasespec_core::{PhaseKind, describe_type_name};

use crate::capture::Output;
use crate::outcome::{Fault, PhaseError, PhaseResult};

/// Conversion of a phase body's return value into a [`PhaseResult`].
///
/// Implemented for `()` and for any `Result<(), E>` whose error converts into [`PhaseError`].
pub trait IntoPhaseResult {
    fn into_phase_result(self) -> PhaseResult;
}

impl IntoPhaseResult for () {
    fn into_phase_result(self) -> PhaseResult {
        Ok(())
    }
}

impl<E: Into<PhaseError>> IntoPhaseResult for Result<(), E> {
    fn into_phase_result(self) -> PhaseResult {
        self.map_err(Into::into)
    }
}

type PhaseBody<S> = Box<dyn Fn(&mut S, &mut Output) -> PhaseResult>;
type Constructor<S> = Rc<dyn Fn() -> Result<S, PhaseError>>;

/// One declared unit of a spec: its kind, a human-readable description and the body to run.
pub struct PhaseOperation<S> {
    kind: PhaseKind,
    description: String,
    skipped: bool,
    body: PhaseBody<S>,
}

impl<S: 'static> PhaseOperation<S> {
    pub fn new<F, R>(kind: PhaseKind, description: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut S, &mut Output) -> R + 'static,
        R: IntoPhaseResult,
    {
        Self {
            kind,
            description: description.into(),
            skipped: false,
            body: Box::new(move |subject: &mut S, out: &mut Output| body(subject, out).into_phase_result()),
        }
    }

    /// Mark the operation as skipped: it is reported but its body never runs.
    pub fn skip(mut self) -> Self {
        self.skipped = true;
        self
    }

    pub fn kind(&self) -> PhaseKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    fn declaration(&self) -> PhaseDecl {
        PhaseDecl {
            kind: self.kind,
            description: self.description.clone(),
            skipped: self.skipped,
        }
    }
}

impl<S> fmt::Debug for PhaseOperation<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseOperation")
            .field("kind", &self.kind)
            .field("description", &self.description)
            .field("skipped", &self.skipped)
            .finish_non_exhaustive()
    }
}

/// The declared shape of one operation, without its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseDecl {
    pub kind: PhaseKind,
    pub description: String,
    pub skipped: bool,
}

/// A live spec subject able to run its operations by declaration index.
pub trait SpecInstance {
    fn run_operation(&mut self, index: usize, out: &mut Output) -> PhaseResult;
}

trait SpecFactory {
    fn declarations(&self) -> &[PhaseDecl];
    fn instantiate(&self) -> Result<Box<dyn SpecInstance>, PhaseError>;
}

struct TypedFactory<S> {
    constructor: Constructor<S>,
    operations: Rc<[PhaseOperation<S>]>,
    declarations: Vec<PhaseDecl>,
}

struct TypedInstance<S> {
    subject: S,
    operations: Rc<[PhaseOperation<S>]>,
}

impl<S: 'static> SpecFactory for TypedFactory<S> {
    fn declarations(&self) -> &[PhaseDecl] {
        &self.declarations
    }

    fn instantiate(&self) -> Result<Box<dyn SpecInstance>, PhaseError> {
        let subject = (self.constructor)()?;
        Ok(Box::new(TypedInstance {
            subject,
            operations: Rc::clone(&self.operations),
        }))
    }
}

impl<S> SpecInstance for TypedInstance<S> {
    fn run_operation(&mut self, index: usize, out: &mut Output) -> PhaseResult {
        match self.operations.get(index) {
            Some(operation) => (operation.body)(&mut self.subject, out),
            None => Err(Fault::new("UnknownOperation", format!("no operation at index {index}")).into()),
        }
    }
}

/// A type-erased spec: name, skip flag, declared operations and a factory for fresh instances.
#[derive(Clone)]
pub struct SpecDefinition {
    name: String,
    skipped: bool,
    factory: Rc<dyn SpecFactory>,
}

impl SpecDefinition {
    /// Build the definition of a [`Spec`] implementor.
    pub fn of<S: Spec>() -> Self {
        let mut builder = SpecBuilder::with_constructor(S::name(), S::construct);
        if S::skipped() {
            builder = builder.skip();
        }
        S::declare(builder).build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Declared operations, in declaration order.
    pub fn declarations(&self) -> &[PhaseDecl] {
        self.factory.declarations()
    }

    /// Construct a fresh subject. Callers run this at the invocation boundary.
    pub(crate) fn instantiate(&self) -> Result<Box<dyn SpecInstance>, PhaseError> {
        self.factory.instantiate()
    }
}

impl fmt::Debug for SpecDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecDefinition")
            .field("name", &self.name)
            .field("skipped", &self.skipped)
            .field("declarations", &self.declarations())
            .finish()
    }
}

/// Fluent construction of a [`SpecDefinition`] from closures.
///
/// ## Examples
/// ```rust
/// use phasespec::{SpecBuilder, should::this};
///
/// let spec = SpecBuilder::<Vec<u32>>::new("pushing onto a vec")
///     .given("an empty vec", |v, _| v.clear())
///     .when("a value is pushed", |v, _| v.push(7))
///     .then("it holds that value", |v, _| this(&v[..]).should().contain(&7))
///     .build();
/// assert_eq!(spec.declarations().len(), 3);
/// ```
pub struct SpecBuilder<S> {
    name: String,
    skipped: bool,
    constructor: Constructor<S>,
    operations: Vec<PhaseOperation<S>>,
}

impl<S: Default + 'static> SpecBuilder<S> {
    /// Start a spec whose subject is built with `S::default()`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_constructor(name, || Subject(S::default()))
    }
}

impl<S: 'static> SpecBuilder<S> {
    /// Start a spec with an explicit, possibly failing, constructor.
    pub fn with_constructor<F, R>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> R + 'static,
        R: IntoSubject<S>,
    {
        Self {
            name: name.into(),
            skipped: false,
            constructor: Rc::new(move || constructor().into_subject()),
            operations: Vec::new(),
        }
    }

    /// Derive the name from a type name, e.g. `bowling::GutterGame` becomes `gutter game`.
    pub fn named_after<T: ?Sized>(mut self) -> Self {
        self.name = describe_type_name(std::any::type_name::<T>());
        self
    }

    pub fn given<F, R>(self, description: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut S, &mut Output) -> R + 'static,
        R: IntoPhaseResult,
    {
        self.phase(PhaseKind::Setup, description, body)
    }

    pub fn when<F, R>(self, description: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut S, &mut Output) -> R + 'static,
        R: IntoPhaseResult,
    {
        self.phase(PhaseKind::Action, description, body)
    }

    pub fn collect<F, R>(self, description: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut S, &mut Output) -> R + 'static,
        R: IntoPhaseResult,
    {
        self.phase(PhaseKind::Collect, description, body)
    }

    pub fn then<F, R>(self, description: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut S, &mut Output) -> R + 'static,
        R: IntoPhaseResult,
    {
        self.phase(PhaseKind::Assert, description, body)
    }

    pub fn after<F, R>(self, description: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut S, &mut Output) -> R + 'static,
        R: IntoPhaseResult,
    {
        self.phase(PhaseKind::Cleanup, description, body)
    }

    pub fn phase<F, R>(self, kind: PhaseKind, description: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut S, &mut Output) -> R + 'static,
        R: IntoPhaseResult,
    {
        self.operation(PhaseOperation::new(kind, description, body))
    }

    /// Declare an operation that is reported as skipped and never runs.
    pub fn skipped_phase<F, R>(self, kind: PhaseKind, description: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut S, &mut Output) -> R + 'static,
        R: IntoPhaseResult,
    {
        self.operation(PhaseOperation::new(kind, description, body).skip())
    }

    pub fn operation(mut self, operation: PhaseOperation<S>) -> Self {
        self.operations.push(operation);
        self
    }

    /// Skip the whole spec.
    pub fn skip(mut self) -> Self {
        self.skipped = true;
        self
    }

    /// Apply a reusable group of declarations, so scenarios can share phases.
    pub fn apply(self, declare: impl FnOnce(Self) -> Self) -> Self {
        declare(self)
    }

    pub fn build(self) -> SpecDefinition {
        let declarations = self.operations.iter().map(PhaseOperation::declaration).collect();
        SpecDefinition {
            name: self.name,
            skipped: self.skipped,
            factory: Rc::new(TypedFactory {
                constructor: self.constructor,
                operations: Rc::from(self.operations),
                declarations,
            }),
        }
    }
}

/// Conversion of a constructor's return value into the subject.
///
/// Implemented for `Result<S, E>` where `E` converts into [`PhaseError`]; plain subjects go through
/// [`Subject`] or [`SpecBuilder::new`].
pub trait IntoSubject<S> {
    fn into_subject(self) -> Result<S, PhaseError>;
}

impl<S, E: Into<PhaseError>> IntoSubject<S> for Result<S, E> {
    fn into_subject(self) -> Result<S, PhaseError> {
        self.map_err(Into::into)
    }
}

/// Wrapper marking an infallibly constructed subject.
pub struct Subject<S>(pub S);

impl<S> IntoSubject<S> for Subject<S> {
    fn into_subject(self) -> Result<S, PhaseError> {
        Ok(self.0)
    }
}

/// A scenario type with phase operations over `&mut self`.
///
/// Usually implemented by the `#[spec]` attribute on an inherent impl block.
pub trait Spec: Sized + 'static {
    /// Display name; defaults to the type name split into lowercase words.
    fn name() -> String {
        describe_type_name(std::any::type_name::<Self>())
    }

    fn skipped() -> bool {
        false
    }

    fn construct() -> Result<Self, PhaseError>;

    fn declare(spec: SpecBuilder<Self>) -> SpecBuilder<Self>;
}
