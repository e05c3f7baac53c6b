//! # nsx-install - NSX-T Deployment Driver
//!
//! nsx-install turns two flat key-value files (factory defaults and the
//! operator's configuration) into the variables document read by the NSX-T
//! Ansible playbooks, then runs those playbooks in a fixed order.
//!
//! ## Core Concepts
//!
//! - **Parameter files**: `key = "value"` text files with comments
//! - **Variables document**: the nested JSON/YAML file every playbook reads
//! - **Switch lookup**: resolving the compute VDS name to its vCenter UUID
//! - **Install sequence**: twelve playbooks run one after another
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌────────────────────┐   ┌────────────────────┐
//! │  nsx-defaults.txt  │   │   nsx-config.txt   │
//! └─────────┬──────────┘   └─────────┬──────────┘
//!           └────────────┬───────────┘
//!                        ▼
//!              ┌───────────────────┐      ┌──────────────┐
//!              │    VarsBuilder    │◄─────│   vCenter    │
//!              │  (pure transform) │ UUID │ (VI/JSON API)│
//!              └─────────┬─────────┘      └──────────────┘
//!                        ▼
//!              ┌───────────────────┐
//!              │ nsx_pacific_vars  │
//!              └─────────┬─────────┘
//!                        ▼
//!              ┌───────────────────┐
//!              │   Orchestrator    │──► ansible-playbook 01..12
//!              └───────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use nsx_install::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let defaults = ParamFile::load("nsx-defaults.txt")?;
//!     let user = ParamFile::load("nsx-config.txt")?;
//!
//!     let client = VsphereClient::builder()
//!         .credentials(VcenterCredentials::from_params(&user)?)
//!         .build()?;
//!     let switch_id = client.switch_uuid(user.require("host_vds_name")?).await?;
//!
//!     let doc = VarsBuilder::new(&defaults, &user).build(&switch_id)?;
//!     doc.write("nsx_pacific_vars.yml", VarsFormat::Json)?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod params;
pub mod playbook;
pub mod vars;
pub mod vsphere;

pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorContext, Result};
    pub use crate::params::ParamFile;
    pub use crate::playbook::{
        AnsibleRunner, DryRunRunner, Orchestrator, PlaybookRunner, Progress, INSTALL_STEPS,
    };
    pub use crate::vars::{VarsBuilder, VarsDocument, VarsFormat};
    pub use crate::vsphere::{SwitchLookup, VcenterCredentials, VsphereClient};
}

pub use error::{Error, Result};
