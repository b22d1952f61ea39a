use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure is raised synchronously to the immediate caller; nothing in this crate swallows
/// or retries an error on its own.
///
/// # Error Categories
///
/// ## Lookup Errors
/// - [`Error::InvalidType`] - Accessor requested for a primitive, void, array or unknown type
/// - [`Error::NotFound`] - No method matched a name / signature / arity lookup
///
/// ## Invocation Errors
/// - [`Error::Index`] - Slot index outside of the dispatcher's method table
/// - [`Error::ArgumentType`] - Argument or receiver failed its cast or unboxing
/// - [`Error::Invocation`] - The target method itself could not be executed
///
/// ## Construction Errors
/// - [`Error::Build`] - The emitter failed to produce a dispatcher unit
/// - [`Error::Malformed`] - Inconsistent descriptors, plans or fragment tables
/// - [`Error::TypeInsert`] - Failed to register a class in the [`crate::runtime::TypeRegistry`]
///
/// # Examples
///
/// ```rust,no_run
/// use methodaccess::{Error, MethodAccess, runtime::{TypeRegistry, TypeRef}};
///
/// let registry = TypeRegistry::new();
/// match MethodAccess::get(&registry, &TypeRef::INT) {
///     Ok(_) => unreachable!(),
///     Err(Error::InvalidType(message)) => eprintln!("rejected: {}", message),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Internal structures are inconsistent.
    ///
    /// Raised when descriptors, call plans or an emitted fragment table do not line up
    /// slot-for-slot, or when a class definition is structurally invalid. The error includes the
    /// source location where the inconsistency was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The requested type can not be served by a method accessor.
    ///
    /// Primitive kinds, `void` and array types have no enumerable methods. Unknown class
    /// tokens are reported through this variant as well.
    #[error("Invalid type for method access - {0}")]
    InvalidType(String),

    /// No method matched the lookup predicate.
    #[error("Unable to find non-private method: {0}")]
    NotFound(String),

    /// The slot index passed to `invoke` is outside of `[0, count)`.
    #[error("No such method - index {index} is out of range for {count} methods")]
    Index {
        /// The requested slot index
        index: usize,
        /// Number of slots in the dispatcher
        count: usize,
    },

    /// An argument or the receiver failed the cast / unboxing required by the call plan.
    ///
    /// The underlying method is not called when this error is raised.
    #[error("Argument type mismatch - {0}")]
    ArgumentType(String),

    /// The emitter failed to produce a dispatcher unit.
    ///
    /// Nothing is registered in the dispatcher cache when this error is raised, so a later
    /// request for the same type performs a fresh build.
    #[error("Failed to build method access unit {unit} - {message}")]
    Build {
        /// Name of the unit that failed to build
        unit: String,
        /// Description of the failure
        message: String,
    },

    /// The target method could not be executed.
    ///
    /// Covers abstract targets without implementation, and failures reported by the native
    /// implementation of a method.
    #[error("Invocation failed - {0}")]
    Invocation(String),

    /// Failed to insert new class into the `TypeRegistry`.
    #[error("Failed to insert new type into TypeRegistry - {0}")]
    TypeInsert(String),
}
