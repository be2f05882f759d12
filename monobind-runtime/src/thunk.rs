// Invocation thunks: one complete bridged call per bound method.
//
// resolve class → resolve method → proxy step → marshal args → invoke →
// marshal result. Resolution failures and managed exceptions follow the
// bridge's ErrorPolicy.

use std::sync::Arc;

use tracing::warn;

use monobind_abi::{method_descriptor, ErrorPolicy, ManagedArg, MethodKind, ObjectRef, TypeRef, CONSTRUCTOR_NAME};

use crate::binding::ClassBinding;
use crate::bridge::Bridge;
use crate::error::{BridgeError, BridgeResult};
use crate::marshal::{self, NativeValue};
use crate::proxy::ObjectProxy;

/// Call-site signature of a bound method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    pub kind: MethodKind,
    /// Explicit parameters only, in declaration order.
    pub params: Vec<TypeRef>,
    pub returns: TypeRef,
}

impl MethodSignature {
    pub fn constructor(params: Vec<TypeRef>) -> Self {
        MethodSignature {
            name: CONSTRUCTOR_NAME.to_string(),
            kind: MethodKind::Constructor,
            params,
            returns: TypeRef::Void,
        }
    }

    pub fn instance(name: impl Into<String>, params: Vec<TypeRef>, returns: TypeRef) -> Self {
        MethodSignature {
            name: name.into(),
            kind: MethodKind::Instance,
            params,
            returns,
        }
    }

    pub fn static_method(name: impl Into<String>, params: Vec<TypeRef>, returns: TypeRef) -> Self {
        MethodSignature {
            name: name.into(),
            kind: MethodKind::Static,
            params,
            returns,
        }
    }

    /// Value a degraded call yields: a null proxy for constructors, the
    /// return type's zero otherwise.
    pub fn default_result(&self) -> NativeValue {
        match self.kind {
            MethodKind::Constructor => NativeValue::Object(None),
            _ => NativeValue::default_for(&self.returns),
        }
    }
}

/// A bound method on a bound class.
#[derive(Debug)]
pub struct Thunk {
    class: Arc<ClassBinding>,
    signature: MethodSignature,
    descriptor: String,
}

impl Thunk {
    pub fn new(class: Arc<ClassBinding>, signature: MethodSignature) -> Self {
        let descriptor = method_descriptor(class.qualified_name(), &signature.name, &signature.params);
        Thunk {
            class,
            signature,
            descriptor,
        }
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// Descriptor text searched for on every call.
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Perform the bridged call.
    ///
    /// `receiver` is required for instance methods and ignored otherwise.
    /// Constructors return `NativeValue::Object(Some(proxy))`; void methods
    /// return `NativeValue::Void`.
    ///
    /// Under `ErrorPolicy::Silent` an unresolved class or method, or a managed
    /// exception, yields [`MethodSignature::default_result`] and nothing after
    /// the failing step runs. Under `ErrorPolicy::Status` the same cases are
    /// returned as errors. Wrong arity, argument types or a missing receiver
    /// are always errors.
    pub fn invoke(
        &self,
        bridge: &Bridge,
        receiver: Option<&ObjectProxy>,
        args: &[NativeValue],
    ) -> BridgeResult<NativeValue> {
        let sig = &self.signature;
        if args.len() != sig.params.len() {
            return Err(BridgeError::ArgumentMismatch(format!(
                "{} takes {} arguments, got {}",
                self.descriptor,
                sig.params.len(),
                args.len()
            )));
        }
        if sig.kind == MethodKind::Instance && receiver.is_none() {
            return Err(BridgeError::InvalidReceiver(self.descriptor.clone()));
        }

        // 1. Class (brings up runtime + assembly on first use).
        let Some(class) = bridge.ensure_class_resolved(&self.class) else {
            return self.degrade(
                bridge,
                BridgeError::ClassNotResolved(self.class.qualified_name().to_string()),
            );
        };

        // 2. Method, freshly resolved every call.
        let Some(method) = bridge.resolve_method(class, &self.descriptor) else {
            return self.degrade(bridge, BridgeError::MethodNotFound(self.descriptor.clone()));
        };

        // 3. Lifetime bridge.
        let domain = bridge.ensure_initialized();
        let mut constructed: Option<ObjectProxy> = None;
        let instance: Option<ObjectRef> = match sig.kind {
            MethodKind::Constructor => {
                let object = bridge.api().new_object(domain, class);
                constructed = Some(ObjectProxy::adopt(bridge.api(), class, object));
                Some(object)
            }
            MethodKind::Instance => receiver.map(ObjectProxy::target),
            MethodKind::Static => None,
        };

        // 4. Arguments, in declaration order.
        let managed_args = sig
            .params
            .iter()
            .zip(args)
            .enumerate()
            .map(|(i, (ty, value))| marshal::to_managed(bridge, domain, i, ty, value))
            .collect::<BridgeResult<Vec<ManagedArg>>>()?;
        let arg_slice = if managed_args.is_empty() {
            None
        } else {
            Some(managed_args.as_slice())
        };

        // 5. Invoke.
        let mut exception = None;
        let result = bridge.api().invoke(method, instance, arg_slice, &mut exception);
        if let Some(exc) = exception {
            // A constructor's half-built proxy is dropped (and released) here
            // under the status policy.
            let err = BridgeError::ManagedException(self.descriptor.clone());
            match bridge.config().error_policy {
                ErrorPolicy::Status => return Err(err),
                ErrorPolicy::Silent => {
                    warn!(method = %self.descriptor, exception = exc.0, "managed exception ignored");
                }
            }
        }

        // 6. Result.
        Ok(match sig.kind {
            MethodKind::Constructor => NativeValue::Object(constructed.map(Arc::new)),
            _ if sig.returns.is_void() => NativeValue::Void,
            _ => marshal::to_native(bridge, &sig.returns, result),
        })
    }

    fn degrade(&self, bridge: &Bridge, err: BridgeError) -> BridgeResult<NativeValue> {
        match bridge.config().error_policy {
            ErrorPolicy::Status => Err(err),
            ErrorPolicy::Silent => {
                warn!(method = %self.descriptor, reason = %err, "call degraded to default value");
                Ok(self.signature.default_result())
            }
        }
    }
}
