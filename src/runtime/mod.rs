mod runner;
mod shutdown;

use crate::periodic::PeriodicTasksDeps;

pub(crate) struct RuntimeDeps {
    pub(crate) periodic_deps: PeriodicTasksDeps,
}

pub(crate) use runner::run;
