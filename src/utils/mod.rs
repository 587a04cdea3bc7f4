pub(crate) mod timezone;
pub(crate) mod which;

pub(crate) use timezone::Timezone;
pub(crate) use which::find_executable;
