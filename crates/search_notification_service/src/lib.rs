/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

pub mod action {
    pub mod notification;
}
pub mod common {
    pub mod types;
    pub mod utils;
}
pub mod environment;
pub mod outbound {
    pub mod fcm;
}
pub mod server;
pub mod store {
    pub mod firestore;
    pub mod paths;
    pub mod types;
}
pub mod tools {
    pub mod callapi;
    pub mod error;
    pub mod logger;
    pub mod prometheus;
}
