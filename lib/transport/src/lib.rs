mod fan;
pub use fan::{FanMode, FanState};

mod mqtt;
pub use mqtt::connect_mqtt;

mod topic;
pub use topic::Topic;

mod update;
pub use update::Update;
