//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use crate::error::check_range;
use crate::{Change, ModelResult};

/// Maximum balance offset toward either channel.
pub const BALANCE_MAX: i8 = 30;
/// The centered balance.
pub const BALANCE_CENTER: i8 = 0;

/// Stereophonic channel balance as a signed offset; negative values lean
/// left, positive lean right. The wire form carries the channel letter
/// and magnitude separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceModel {
    balance: i8,
}

impl BalanceModel {
    /// Returns the signed balance.
    pub fn balance(&self) -> i8 {
        self.balance
    }

    /// Sets the signed balance.
    pub fn set_balance(&mut self, balance: i8) -> ModelResult<Change> {
        check_range(balance, -BALANCE_MAX, BALANCE_MAX)?;

        if self.balance == balance {
            Ok(Change::Unchanged)
        } else {
            self.balance = balance;
            Ok(Change::Changed)
        }
    }

    /// Steps the balance one unit toward the left channel.
    pub fn increase_left(&mut self) -> ModelResult<i8> {
        check_range(self.balance - 1, -BALANCE_MAX, BALANCE_MAX)?;
        self.balance -= 1;
        Ok(self.balance)
    }

    /// Steps the balance one unit toward the right channel.
    pub fn increase_right(&mut self) -> ModelResult<i8> {
        check_range(self.balance + 1, -BALANCE_MAX, BALANCE_MAX)?;
        self.balance += 1;
        Ok(self.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_centered() {
        assert_eq!(BalanceModel::default().balance(), BALANCE_CENTER);
    }

    #[test]
    fn test_range() {
        let mut balance = BalanceModel::default();
        assert!(balance.set_balance(-BALANCE_MAX).is_ok());
        assert!(balance.set_balance(BALANCE_MAX).is_ok());
        assert!(balance.set_balance(BALANCE_MAX + 1).is_err());
    }

    #[test]
    fn test_already_set() {
        let mut balance = BalanceModel::default();
        let _ = balance.set_balance(10).unwrap();
        assert!(!balance.set_balance(10).unwrap().is_changed());
    }

    #[test]
    fn test_steps_saturate_at_rails() {
        let mut balance = BalanceModel::default();
        let _ = balance.set_balance(-BALANCE_MAX).unwrap();
        assert!(balance.increase_left().is_err());
        assert_eq!(balance.balance(), -BALANCE_MAX);

        let _ = balance.set_balance(BALANCE_MAX).unwrap();
        assert!(balance.increase_right().is_err());
    }
}
