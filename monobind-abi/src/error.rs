/// Outcome codes written through a thunk's status out-parameter.
///
/// Shared between generated C (`monobind_status`) and the Rust bridge.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindStatus {
    Ok = 0,
    ClassNotFound = 1,
    MethodNotFound = 2,
    Exception = 3,
}

impl BindStatus {
    pub const ALL: [BindStatus; 4] = [
        BindStatus::Ok,
        BindStatus::ClassNotFound,
        BindStatus::MethodNotFound,
        BindStatus::Exception,
    ];

    /// Enumerator name in the support header.
    pub fn c_name(self) -> &'static str {
        match self {
            BindStatus::Ok => "MONOBIND_OK",
            BindStatus::ClassNotFound => "MONOBIND_CLASS_NOT_FOUND",
            BindStatus::MethodNotFound => "MONOBIND_METHOD_NOT_FOUND",
            BindStatus::Exception => "MONOBIND_EXCEPTION",
        }
    }
}
