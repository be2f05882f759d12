// In-memory stand-in for the managed runtime, used by the unit tests.
//
// Classes and methods are registered up front; method bodies are closures over
// a tiny object heap. Every embedding call is counted and logged so tests can
// assert on what the bridge did and in which order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use monobind_abi::{
    AssemblyHandle, AssemblyLocator, BoundaryHandle, ClassHandle, DescriptorHandle, DomainHandle,
    EmbeddingApi, ImageHandle, ManagedArg, MethodHandle, ObjectRef, Primitive, PrimitiveType,
};

use crate::lock_or_recover;

const STUB_DOMAIN: DomainHandle = DomainHandle(1);
const STUB_ASSEMBLY: AssemblyHandle = AssemblyHandle(1);
const STUB_IMAGE: ImageHandle = ImageHandle(1);

/// What a stub method body hands back. `Err` from a body is a thrown exception.
#[derive(Debug, Clone)]
pub enum StubReturn {
    Void,
    Value(Primitive),
    Str(String),
    Object(ObjectRef),
}

type Body = Arc<dyn Fn(&mut StubHeap, Option<ObjectRef>, &[ManagedArg]) -> Result<StubReturn, String> + Send + Sync>;

#[derive(Debug)]
enum HeapObject {
    Instance {
        class: ClassHandle,
        fields: HashMap<String, Primitive>,
        texts: HashMap<String, String>,
    },
    Str(String),
    Boxed(Primitive),
    Exception(String),
}

/// Object store shared by all stub method bodies. Ids start at 1; 0 is null.
#[derive(Debug, Default)]
pub struct StubHeap {
    objects: Vec<HeapObject>,
}

impl StubHeap {
    fn alloc(&mut self, object: HeapObject) -> ObjectRef {
        self.objects.push(object);
        ObjectRef(self.objects.len() as u64)
    }

    fn get(&self, obj: ObjectRef) -> Option<&HeapObject> {
        (obj.0 as usize).checked_sub(1).and_then(|i| self.objects.get(i))
    }

    fn get_mut(&mut self, obj: ObjectRef) -> Option<&mut HeapObject> {
        (obj.0 as usize).checked_sub(1).and_then(|i| self.objects.get_mut(i))
    }

    pub fn alloc_instance(&mut self, class: ClassHandle) -> ObjectRef {
        self.alloc(HeapObject::Instance {
            class,
            fields: HashMap::new(),
            texts: HashMap::new(),
        })
    }

    pub fn alloc_string(&mut self, text: impl Into<String>) -> ObjectRef {
        self.alloc(HeapObject::Str(text.into()))
    }

    pub fn field(&self, obj: ObjectRef, name: &str) -> Option<Primitive> {
        match self.get(obj)? {
            HeapObject::Instance { fields, .. } => fields.get(name).copied(),
            _ => None,
        }
    }

    pub fn set_field(&mut self, obj: ObjectRef, name: &str, value: Primitive) {
        if let Some(HeapObject::Instance { fields, .. }) = self.get_mut(obj) {
            fields.insert(name.to_string(), value);
        }
    }

    pub fn text(&self, obj: ObjectRef, name: &str) -> Option<String> {
        match self.get(obj)? {
            HeapObject::Instance { texts, .. } => texts.get(name).cloned(),
            _ => None,
        }
    }

    pub fn set_text(&mut self, obj: ObjectRef, name: &str, value: String) {
        if let Some(HeapObject::Instance { texts, .. }) = self.get_mut(obj) {
            texts.insert(name.to_string(), value);
        }
    }

    /// Contents of a managed string; `None` for null or non-strings.
    pub fn string(&self, obj: ObjectRef) -> Option<String> {
        match self.get(obj)? {
            HeapObject::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Per-operation call counts.
#[derive(Debug, Clone, Default)]
pub struct Calls {
    pub load_configuration: usize,
    pub initialize_runtime: usize,
    pub open_assembly: usize,
    pub get_image: usize,
    pub resolve_class: usize,
    pub build_method_descriptor: usize,
    pub search_method: usize,
    pub release_descriptor: usize,
    pub new_object: usize,
    pub new_boundary_handle: usize,
    pub resolve_boundary_handle: usize,
    pub release_boundary_handle: usize,
    pub invoke: usize,
    pub new_string: usize,
    pub string_to_utf8: usize,
    pub unbox: usize,
    pub object_class: usize,
}

impl Calls {
    fn bump(&mut self, op: &str) {
        let slot = match op {
            "load_configuration" => &mut self.load_configuration,
            "initialize_runtime" => &mut self.initialize_runtime,
            "open_assembly" => &mut self.open_assembly,
            "get_image" => &mut self.get_image,
            "resolve_class" => &mut self.resolve_class,
            "build_method_descriptor" => &mut self.build_method_descriptor,
            "search_method" => &mut self.search_method,
            "release_descriptor" => &mut self.release_descriptor,
            "new_object" => &mut self.new_object,
            "new_boundary_handle" => &mut self.new_boundary_handle,
            "resolve_boundary_handle" => &mut self.resolve_boundary_handle,
            "release_boundary_handle" => &mut self.release_boundary_handle,
            "invoke" => &mut self.invoke,
            "new_string" => &mut self.new_string,
            "string_to_utf8" => &mut self.string_to_utf8,
            "unbox" => &mut self.unbox,
            "object_class" => &mut self.object_class,
            other => panic!("unknown stub op {other}"),
        };
        *slot += 1;
    }
}

struct StubMethod {
    class: ClassHandle,
    descriptor: String,
    body: Body,
}

type InvokeRecord = (Option<ObjectRef>, Option<Vec<ManagedArg>>);

#[derive(Default)]
struct State {
    heap: StubHeap,
    classes: Vec<(String, String)>,
    methods: Vec<StubMethod>,
    descriptors: HashMap<u64, String>,
    next_descriptor: u64,
    boundary: HashMap<u32, ObjectRef>,
    next_boundary: u32,
    calls: Calls,
    op_log: Vec<&'static str>,
    domain_args: Vec<(String, String)>,
    last_invoke: Option<InvokeRecord>,
    /// `get_image` yields null for the opened assembly.
    no_image: bool,
}

impl State {
    fn record(&mut self, op: &'static str) {
        self.calls.bump(op);
        self.op_log.push(op);
    }
}

/// A fake runtime hosting a single assembly.
pub struct StubRuntime {
    assembly_file: String,
    state: Mutex<State>,
}

impl StubRuntime {
    /// `assembly` is the simple name; only `<assembly>.dll` opens.
    pub fn new(assembly: &str) -> Self {
        StubRuntime {
            assembly_file: format!("{assembly}.dll"),
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        lock_or_recover(&self.state)
    }

    pub fn domain(&self) -> DomainHandle {
        STUB_DOMAIN
    }

    pub fn define_class(&self, namespace: &str, name: &str) -> ClassHandle {
        let mut state = self.state();
        state.classes.push((namespace.to_string(), name.to_string()));
        ClassHandle(state.classes.len() as u64)
    }

    pub fn define_method<F>(&self, class: ClassHandle, descriptor: &str, body: F)
    where
        F: Fn(&mut StubHeap, Option<ObjectRef>, &[ManagedArg]) -> Result<StubReturn, String>
            + Send
            + Sync
            + 'static,
    {
        self.state().methods.push(StubMethod {
            class,
            descriptor: descriptor.to_string(),
            body: Arc::new(body),
        });
    }

    pub fn define_static<F>(&self, class: ClassHandle, descriptor: &str, body: F)
    where
        F: Fn(&mut StubHeap, &[ManagedArg]) -> Result<StubReturn, String> + Send + Sync + 'static,
    {
        self.define_method(class, descriptor, move |heap, _, args| body(heap, args));
    }

    /// Make the assembly open without a metadata image.
    pub fn without_image(&self) {
        self.state().no_image = true;
    }

    pub fn calls(&self) -> Calls {
        self.state().calls.clone()
    }

    pub fn op_log(&self) -> Vec<&'static str> {
        self.state().op_log.clone()
    }

    pub fn domain_args(&self) -> Vec<(String, String)> {
        self.state().domain_args.clone()
    }

    pub fn live_descriptors(&self) -> usize {
        self.state().descriptors.len()
    }

    pub fn live_boundary_handles(&self) -> usize {
        self.state().boundary.len()
    }

    pub fn heap_string(&self, obj: ObjectRef) -> Option<String> {
        self.state().heap.string(obj)
    }

    pub fn alloc_boxed(&self, value: Primitive) -> ObjectRef {
        self.state().heap.alloc(HeapObject::Boxed(value))
    }

    /// Receiver of the most recent invoke; `None` if nothing was invoked.
    pub fn last_invoke_instance(&self) -> Option<Option<ObjectRef>> {
        self.state().last_invoke.as_ref().map(|(instance, _)| *instance)
    }

    /// Argument vector of the most recent invoke; `None` if nothing was invoked.
    pub fn last_invoke_args(&self) -> Option<Option<Vec<ManagedArg>>> {
        self.state().last_invoke.as_ref().map(|(_, args)| args.clone())
    }
}

impl EmbeddingApi for StubRuntime {
    fn load_configuration(&self) {
        self.state().record("load_configuration");
    }

    fn initialize_runtime(&self, domain_name: &str, version: &str) -> DomainHandle {
        let mut state = self.state();
        state.record("initialize_runtime");
        state.domain_args.push((domain_name.to_string(), version.to_string()));
        STUB_DOMAIN
    }

    fn open_assembly(&self, _domain: DomainHandle, path: &Path) -> AssemblyHandle {
        self.state().record("open_assembly");
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n == self.assembly_file);
        if matches { STUB_ASSEMBLY } else { AssemblyHandle::null() }
    }

    fn get_image(&self, assembly: AssemblyHandle) -> ImageHandle {
        let mut state = self.state();
        state.record("get_image");
        if assembly == STUB_ASSEMBLY && !state.no_image { STUB_IMAGE } else { ImageHandle::null() }
    }

    fn resolve_class(&self, image: ImageHandle, namespace: &str, name: &str) -> ClassHandle {
        let mut state = self.state();
        state.record("resolve_class");
        if image != STUB_IMAGE {
            return ClassHandle::null();
        }
        state
            .classes
            .iter()
            .position(|(ns, n)| ns == namespace && n == name)
            .map_or(ClassHandle::null(), |i| ClassHandle(i as u64 + 1))
    }

    fn build_method_descriptor(&self, signature: &str, _include_namespace: bool) -> DescriptorHandle {
        let mut state = self.state();
        state.record("build_method_descriptor");
        state.next_descriptor += 1;
        let id = state.next_descriptor;
        state.descriptors.insert(id, signature.to_string());
        DescriptorHandle(id)
    }

    fn search_method(&self, descriptor: DescriptorHandle, class: ClassHandle) -> MethodHandle {
        let mut state = self.state();
        state.record("search_method");
        let Some(text) = state.descriptors.get(&descriptor.0) else {
            return MethodHandle::null();
        };
        state
            .methods
            .iter()
            .position(|m| m.class == class && &m.descriptor == text)
            .map_or(MethodHandle::null(), |i| MethodHandle(i as u64 + 1))
    }

    fn release_descriptor(&self, descriptor: DescriptorHandle) {
        let mut state = self.state();
        state.record("release_descriptor");
        state.descriptors.remove(&descriptor.0);
    }

    fn new_object(&self, _domain: DomainHandle, class: ClassHandle) -> ObjectRef {
        let mut state = self.state();
        state.record("new_object");
        state.heap.alloc_instance(class)
    }

    fn new_boundary_handle(&self, object: ObjectRef, _pinned: bool) -> BoundaryHandle {
        let mut state = self.state();
        state.record("new_boundary_handle");
        state.next_boundary += 1;
        let id = state.next_boundary;
        state.boundary.insert(id, object);
        BoundaryHandle(id)
    }

    fn resolve_boundary_handle(&self, handle: BoundaryHandle) -> ObjectRef {
        let mut state = self.state();
        state.record("resolve_boundary_handle");
        state.boundary.get(&handle.0).copied().unwrap_or_default()
    }

    fn release_boundary_handle(&self, handle: BoundaryHandle) {
        let mut state = self.state();
        state.record("release_boundary_handle");
        state.boundary.remove(&handle.0);
    }

    fn invoke(
        &self,
        method: MethodHandle,
        instance: Option<ObjectRef>,
        args: Option<&[ManagedArg]>,
        exception: &mut Option<ObjectRef>,
    ) -> ObjectRef {
        let mut state = self.state();
        state.record("invoke");
        state.last_invoke = Some((instance, args.map(<[ManagedArg]>::to_vec)));
        let Some(body) = (method.0 as usize)
            .checked_sub(1)
            .and_then(|i| state.methods.get(i))
            .map(|m| Arc::clone(&m.body))
        else {
            return ObjectRef::null();
        };

        let heap = &mut state.heap;
        match body(heap, instance, args.unwrap_or(&[])) {
            Ok(StubReturn::Void) => ObjectRef::null(),
            Ok(StubReturn::Value(p)) => heap.alloc(HeapObject::Boxed(p)),
            Ok(StubReturn::Str(s)) => heap.alloc_string(s),
            Ok(StubReturn::Object(obj)) => obj,
            Err(message) => {
                *exception = Some(heap.alloc(HeapObject::Exception(message)));
                ObjectRef::null()
            }
        }
    }

    fn new_string(&self, _domain: DomainHandle, text: &str) -> ObjectRef {
        let mut state = self.state();
        state.record("new_string");
        state.heap.alloc_string(text)
    }

    fn string_to_utf8(&self, string: ObjectRef) -> Option<String> {
        let mut state = self.state();
        state.record("string_to_utf8");
        state.heap.string(string)
    }

    fn unbox(&self, boxed: ObjectRef, ty: PrimitiveType) -> Option<Primitive> {
        let mut state = self.state();
        state.record("unbox");
        match state.heap.get(boxed)? {
            HeapObject::Boxed(p) if p.ty() == ty => Some(*p),
            _ => None,
        }
    }

    fn object_class(&self, object: ObjectRef) -> ClassHandle {
        let mut state = self.state();
        state.record("object_class");
        match state.heap.get(object) {
            Some(HeapObject::Instance { class, .. }) => *class,
            _ => ClassHandle::null(),
        }
    }
}

/// Locator that either finds every file at its bare name or finds nothing.
#[derive(Debug, Default)]
pub struct StubLocator {
    missing: bool,
}

impl StubLocator {
    pub fn missing() -> Self {
        StubLocator { missing: true }
    }
}

impl AssemblyLocator for StubLocator {
    fn find_assembly_path(&self, file_name: &str) -> Option<PathBuf> {
        if self.missing { None } else { Some(PathBuf::from(file_name)) }
    }
}
