//! Runtime type surfaces
//!
//! This module is the introspection facility the resolver queries. Rust has no
//! runtime reflection, so every type that wants to take part in discovery
//! declares its surface once:
//!
//! - **Constructors**: ordered parameter types, produce an instance of the owner
//! - **Methods**: a name, a receiver kind (static or instance), ordered
//!   parameter types and a return type
//!
//! Surfaces are collected in a [`TypeRegistry`]. Declaration order is kept,
//! and it is the order the resolver enumerates candidates in.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut registry = TypeRegistry::with_builtins();
//! registry.register(
//!     SurfaceBuilder::<Fraction>::new()
//!         .constructor2(|n: i32, d: i32| Fraction::new(n, d))
//!         .constructor(|n: i32| Fraction::new(n, 1))
//!         .method("to_f64", |f: &Fraction| f.to_f64()),
//! );
//! ```

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::InvocationError;
use crate::value::{TargetType, Value, ValueType};

type ConstructorFn = Arc<dyn Fn(&[Value]) -> Result<Value, InvocationError> + Send + Sync>;
type MethodFn =
    Arc<dyn Fn(Option<&Value>, &[Value]) -> Result<Value, InvocationError> + Send + Sync>;

/// Whether a method is invoked on the type or on an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Receiver {
    Static,
    Instance,
}

fn check_arity(expected: usize, args: &[Value]) -> Result<(), InvocationError> {
    if expected == args.len() {
        Ok(())
    } else {
        Err(InvocationError::Arity {
            expected,
            actual: args.len(),
        })
    }
}

fn join_params(params: &[TargetType]) -> String {
    params
        .iter()
        .map(TargetType::simple_name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A public constructor of a type
#[derive(Clone)]
pub struct Constructor {
    owner: TargetType,
    params: Vec<TargetType>,
    invoke: ConstructorFn,
}

impl Constructor {
    pub fn new<F>(owner: TargetType, params: Vec<TargetType>, invoke: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        Self {
            owner,
            params,
            invoke: Arc::new(invoke),
        }
    }

    pub fn owner(&self) -> TargetType {
        self.owner
    }

    pub fn params(&self) -> &[TargetType] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Invokes the constructor; arguments must already match the parameters
    pub fn invoke(&self, args: &[Value]) -> Result<Value, InvocationError> {
        check_arity(self.arity(), args)?;
        (self.invoke)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.owner, join_params(&self.params))
    }
}

/// A public method of a type
#[derive(Clone)]
pub struct Method {
    name: String,
    receiver: Receiver,
    params: Vec<TargetType>,
    returns: TargetType,
    invoke: MethodFn,
}

impl Method {
    pub fn new<F>(
        name: impl Into<String>,
        receiver: Receiver,
        params: Vec<TargetType>,
        returns: TargetType,
        invoke: F,
    ) -> Self
    where
        F: Fn(Option<&Value>, &[Value]) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            receiver,
            params,
            returns,
            invoke: Arc::new(invoke),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn receiver(&self) -> Receiver {
        self.receiver
    }

    pub fn is_static(&self) -> bool {
        self.receiver == Receiver::Static
    }

    pub fn params(&self) -> &[TargetType] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn returns(&self) -> TargetType {
        self.returns
    }

    /// Invokes a static method
    pub fn invoke_static(&self, args: &[Value]) -> Result<Value, InvocationError> {
        check_arity(self.arity(), args)?;
        (self.invoke)(None, args)
    }

    /// Invokes an instance method on `receiver`
    pub fn invoke_on(&self, receiver: &Value, args: &[Value]) -> Result<Value, InvocationError> {
        check_arity(self.arity(), args)?;
        (self.invoke)(Some(receiver), args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static() {
            f.write_str("static ")?;
        }
        write!(
            f,
            "{}({}) -> {}",
            self.name,
            join_params(&self.params),
            self.returns
        )
    }
}

/// The constructors and methods one type exposes, in declaration order
#[derive(Debug, Clone, Default)]
pub struct TypeSurface {
    constructors: Vec<Constructor>,
    methods: Vec<Method>,
}

impl TypeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn push_constructor(&mut self, constructor: Constructor) {
        self.constructors.push(constructor);
    }

    pub fn push_method(&mut self, method: Method) {
        self.methods.push(method);
    }

    /// Appends another surface's members after this one's
    pub fn extend(&mut self, other: TypeSurface) {
        self.constructors.extend(other.constructors);
        self.methods.extend(other.methods);
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty() && self.methods.is_empty()
    }
}

fn argument<A: ValueType>(value: &Value) -> Result<A, InvocationError> {
    A::from_value(value)
        .ok_or_else(|| InvocationError::argument_mismatch(&A::target_type(), value))
}

fn receiver_of<T: ValueType>(method: &str, receiver: Option<&Value>) -> Result<T, InvocationError> {
    let receiver =
        receiver.ok_or_else(|| InvocationError::MissingReceiver(method.to_string()))?;
    argument::<T>(receiver)
}

/// Typed builder for the surface of `T`
///
/// Closures receive already-unwrapped Rust values; fallible closures report
/// their error through [`InvocationError::Failed`].
pub struct SurfaceBuilder<T> {
    surface: TypeSurface,
    _owner: PhantomData<fn() -> T>,
}

impl<T: ValueType> SurfaceBuilder<T> {
    pub fn new() -> Self {
        Self {
            surface: TypeSurface::new(),
            _owner: PhantomData,
        }
    }

    /// Declares a one-argument constructor
    pub fn constructor<A, E, F>(mut self, f: F) -> Self
    where
        A: ValueType,
        E: fmt::Display,
        F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
    {
        self.surface.push_constructor(Constructor::new(
            T::target_type(),
            vec![A::target_type()],
            move |args| {
                let a = argument::<A>(&args[0])?;
                f(a).map(ValueType::into_value)
                    .map_err(InvocationError::failed)
            },
        ));
        self
    }

    /// Declares a two-argument constructor
    pub fn constructor2<A, B, E, F>(mut self, f: F) -> Self
    where
        A: ValueType,
        B: ValueType,
        E: fmt::Display,
        F: Fn(A, B) -> Result<T, E> + Send + Sync + 'static,
    {
        self.surface.push_constructor(Constructor::new(
            T::target_type(),
            vec![A::target_type(), B::target_type()],
            move |args| {
                let a = argument::<A>(&args[0])?;
                let b = argument::<B>(&args[1])?;
                f(a, b)
                    .map(ValueType::into_value)
                    .map_err(InvocationError::failed)
            },
        ));
        self
    }

    /// Declares a one-argument static method returning `R`
    pub fn factory<A, R, E, F>(mut self, name: &str, f: F) -> Self
    where
        A: ValueType,
        R: ValueType,
        E: fmt::Display,
        F: Fn(A) -> Result<R, E> + Send + Sync + 'static,
    {
        self.surface.push_method(Method::new(
            name,
            Receiver::Static,
            vec![A::target_type()],
            R::target_type(),
            move |_, args| {
                let a = argument::<A>(&args[0])?;
                f(a).map(ValueType::into_value)
                    .map_err(InvocationError::failed)
            },
        ));
        self
    }

    /// Declares a zero-argument instance method
    pub fn method<R, F>(mut self, name: &str, f: F) -> Self
    where
        R: ValueType,
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        let method_name = name.to_string();
        self.surface.push_method(Method::new(
            name,
            Receiver::Instance,
            Vec::new(),
            R::target_type(),
            move |receiver, _| {
                let this = receiver_of::<T>(&method_name, receiver)?;
                Ok(f(&this).into_value())
            },
        ));
        self
    }

    /// Declares a fallible zero-argument instance method
    pub fn try_method<R, E, F>(mut self, name: &str, f: F) -> Self
    where
        R: ValueType,
        E: fmt::Display,
        F: Fn(&T) -> Result<R, E> + Send + Sync + 'static,
    {
        let method_name = name.to_string();
        self.surface.push_method(Method::new(
            name,
            Receiver::Instance,
            Vec::new(),
            R::target_type(),
            move |receiver, _| {
                let this = receiver_of::<T>(&method_name, receiver)?;
                f(&this)
                    .map(ValueType::into_value)
                    .map_err(InvocationError::failed)
            },
        ));
        self
    }

    /// Declares a one-argument instance method
    pub fn method1<A, R, F>(mut self, name: &str, f: F) -> Self
    where
        A: ValueType,
        R: ValueType,
        F: Fn(&T, A) -> R + Send + Sync + 'static,
    {
        let method_name = name.to_string();
        self.surface.push_method(Method::new(
            name,
            Receiver::Instance,
            vec![A::target_type()],
            R::target_type(),
            move |receiver, args| {
                let this = receiver_of::<T>(&method_name, receiver)?;
                let a = argument::<A>(&args[0])?;
                Ok(f(&this, a).into_value())
            },
        ));
        self
    }

    /// Declares a constructor working on untyped values
    pub fn raw_constructor<F>(mut self, params: Vec<TargetType>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        self.surface
            .push_constructor(Constructor::new(T::target_type(), params, f));
        self
    }

    /// Declares a method working on untyped values
    pub fn raw_method<F>(
        mut self,
        name: &str,
        receiver: Receiver,
        params: Vec<TargetType>,
        returns: TargetType,
        f: F,
    ) -> Self
    where
        F: Fn(Option<&Value>, &[Value]) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        self.surface
            .push_method(Method::new(name, receiver, params, returns, f));
        self
    }

    pub fn build(self) -> TypeSurface {
        self.surface
    }
}

impl<T: ValueType> Default for SurfaceBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only lookup of type surfaces by type
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    surfaces: HashMap<TargetType, TypeSurface>,
}

impl TypeRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the surfaces of the standard domains
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register(&mut registry);
        registry
    }

    /// Registers the surface built for `T`, after anything already declared
    pub fn register<T: ValueType>(&mut self, builder: SurfaceBuilder<T>) -> &mut Self {
        self.register_surface(T::target_type(), builder.build())
    }

    pub fn register_surface(&mut self, owner: TargetType, surface: TypeSurface) -> &mut Self {
        self.surfaces.entry(owner).or_default().extend(surface);
        self
    }

    pub fn surface(&self, owner: &TargetType) -> Option<&TypeSurface> {
        self.surfaces.get(owner)
    }

    /// Constructors of `owner` in declaration order
    pub fn constructors(&self, owner: &TargetType) -> &[Constructor] {
        self.surface(owner)
            .map(TypeSurface::constructors)
            .unwrap_or_default()
    }

    /// Methods of `owner` in declaration order
    pub fn methods(&self, owner: &TargetType) -> &[Method] {
        self.surface(owner)
            .map(TypeSurface::methods)
            .unwrap_or_default()
    }

    pub fn contains(&self, owner: &TargetType) -> bool {
        self.surfaces.contains_key(owner)
    }

    /// Number of types with a registered surface
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}
