use super::create::S7Client;
use crate::errors::Error;
use crate::s7_protocol::userdata;
use crate::S7Pool;

pub use crate::s7_protocol::userdata::{BlockCounts, CpuState};

/// *Methods for inspecting and controlling the PLC's run state*
impl S7Client {
    /// Counts the blocks of each kind currently loaded on the PLC.
    ///
    /// # Errors
    ///
    /// Will return `Error` if the PLC rejects the request.
    pub async fn list_blocks(&mut self) -> Result<BlockCounts, Error> {
        self.validate_connection_info().await?;
        userdata::list_blocks(self).await
    }

    /// Reads one System Status List entry, reassembling it across however
    /// many USERDATA telegrams the PLC needs to deliver it.
    ///
    /// # Errors
    ///
    /// Will return `Error` if the PLC rejects the request.
    pub async fn read_szl(&mut self, id: u16, index: u16) -> Result<Vec<u8>, Error> {
        self.validate_connection_info().await?;
        userdata::read_szl(self, id, index).await
    }

    /// Queries whether the CPU is currently running or stopped.
    ///
    /// # Errors
    ///
    /// Will return `Error` if the PLC rejects the request.
    pub async fn cpu_state(&mut self) -> Result<CpuState, Error> {
        self.validate_connection_info().await?;
        userdata::cpu_state(self).await
    }

    /// Stops the PLC's program execution.
    ///
    /// # Errors
    ///
    /// Will return `Error` if the PLC rejects the request.
    pub async fn plc_stop(&mut self) -> Result<(), Error> {
        self.validate_connection_info().await?;
        userdata::plc_stop(self).await
    }

    /// Starts the PLC's program execution, keeping the current process image (hot start).
    ///
    /// # Errors
    ///
    /// Will return `Error` if the PLC rejects the request.
    pub async fn plc_hot_start(&mut self) -> Result<(), Error> {
        self.validate_connection_info().await?;
        userdata::plc_hot_start(self).await
    }

    /// Starts the PLC's program execution after resetting the process image (cold start).
    ///
    /// # Errors
    ///
    /// Will return `Error` if the PLC rejects the request.
    pub async fn plc_cold_start(&mut self) -> Result<(), Error> {
        self.validate_connection_info().await?;
        userdata::plc_cold_start(self).await
    }
}

/// *Methods for inspecting and controlling the PLC's run state*
impl S7Pool {
    /// Counts the blocks of each kind currently loaded on the PLC.
    ///
    /// # Errors
    ///
    /// Will return `Error` if the PLC rejects the request.
    pub async fn list_blocks(&self) -> Result<BlockCounts, Error> {
        let mut connection = self.0.get().await?;
        connection.list_blocks().await
    }

    /// Reads one System Status List entry, reassembling it across however
    /// many USERDATA telegrams the PLC needs to deliver it.
    ///
    /// # Errors
    ///
    /// Will return `Error` if the PLC rejects the request.
    pub async fn read_szl(&self, id: u16, index: u16) -> Result<Vec<u8>, Error> {
        let mut connection = self.0.get().await?;
        connection.read_szl(id, index).await
    }

    /// Queries whether the CPU is currently running or stopped.
    ///
    /// # Errors
    ///
    /// Will return `Error` if the PLC rejects the request.
    pub async fn cpu_state(&self) -> Result<CpuState, Error> {
        let mut connection = self.0.get().await?;
        connection.cpu_state().await
    }

    /// Stops the PLC's program execution.
    ///
    /// # Errors
    ///
    /// Will return `Error` if the PLC rejects the request.
    pub async fn plc_stop(&self) -> Result<(), Error> {
        let mut connection = self.0.get().await?;
        connection.plc_stop().await
    }

    /// Starts the PLC's program execution, keeping the current process image (hot start).
    ///
    /// # Errors
    ///
    /// Will return `Error` if the PLC rejects the request.
    pub async fn plc_hot_start(&self) -> Result<(), Error> {
        let mut connection = self.0.get().await?;
        connection.plc_hot_start().await
    }

    /// Starts the PLC's program execution after resetting the process image (cold start).
    ///
    /// # Errors
    ///
    /// Will return `Error` if the PLC rejects the request.
    pub async fn plc_cold_start(&self) -> Result<(), Error> {
        let mut connection = self.0.get().await?;
        connection.plc_cold_start().await
    }
}
