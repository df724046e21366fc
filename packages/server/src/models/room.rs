use super::chat::ChatMessage;
use super::user::User;

#[derive(Debug, Clone)]
pub struct Member {
    pub user: User,
    pub muted: bool,
    pub deafened: bool,
}

/// Named chat channel. Mute and deafen flags are per room, so one user can be
/// silenced in the town square while still talking in a faction channel.
#[derive(Debug, Clone)]
pub struct MessageRoom {
    pub name: String,
    members: Vec<Member>,
}

impl MessageRoom {
    pub fn new(name: impl Into<String>) -> Self {
        MessageRoom {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn add_member(&mut self, user: User) {
        if self.contains(user.username()) {
            return;
        }
        self.members.push(Member {
            user,
            muted: false,
            deafened: false,
        });
    }

    pub fn remove_member(&mut self, username: &str) -> bool {
        let before = self.members.len();
        self.members
            .retain(|m| !m.user.username().eq_ignore_ascii_case(username));
        self.members.len() != before
    }

    /// Swaps in a fresh connection handle for a reconnecting user, keeping
    /// their mute/deafen state.
    pub fn rebind(&mut self, user: &User) {
        if let Some(member) = self.member_mut(user.username()) {
            member.user = user.clone();
        }
    }

    pub fn contains(&self, username: &str) -> bool {
        self.members
            .iter()
            .any(|m| m.user.username().eq_ignore_ascii_case(username))
    }

    pub fn member(&self, username: &str) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| m.user.username().eq_ignore_ascii_case(username))
    }

    fn member_mut(&mut self, username: &str) -> Option<&mut Member> {
        self.members
            .iter_mut()
            .find(|m| m.user.username().eq_ignore_ascii_case(username))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn mute(&mut self, username: &str) {
        if let Some(member) = self.member_mut(username) {
            member.muted = true;
        }
    }

    pub fn unmute(&mut self, username: &str) {
        if let Some(member) = self.member_mut(username) {
            member.muted = false;
        }
    }

    pub fn deafen(&mut self, username: &str) {
        if let Some(member) = self.member_mut(username) {
            member.deafened = true;
        }
    }

    pub fn undeafen(&mut self, username: &str) {
        if let Some(member) = self.member_mut(username) {
            member.deafened = false;
        }
    }

    pub fn mute_all(&mut self) {
        self.members.iter_mut().for_each(|m| m.muted = true);
    }

    pub fn unmute_all(&mut self) {
        self.members.iter_mut().for_each(|m| m.muted = false);
    }

    pub fn deafen_all(&mut self) {
        self.members.iter_mut().for_each(|m| m.deafened = true);
    }

    pub fn undeafen_all(&mut self) {
        self.members.iter_mut().for_each(|m| m.deafened = false);
    }

    pub fn is_muted(&self, username: &str) -> bool {
        self.member(username).map(|m| m.muted).unwrap_or(true)
    }

    /// Delivers a member's message. Returns how many members received it;
    /// zero when the sender is muted or not in the room.
    pub fn receive(&self, sender: &str, message: &ChatMessage) -> usize {
        match self.member(sender) {
            Some(member) if !member.muted => self.deliver(message),
            _ => 0,
        }
    }

    /// Delivers regardless of anyone's mute state.
    pub fn broadcast(&self, message: &ChatMessage) -> usize {
        self.deliver(message)
    }

    fn deliver(&self, message: &ChatMessage) -> usize {
        let mut delivered = 0;
        for member in self.members.iter().filter(|m| !m.deafened) {
            member.user.send_chat(message.clone());
            delivered += 1;
        }
        delivered
    }
}

/// The set of rooms a session owns, in creation order.
#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    rooms: Vec<MessageRoom>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&MessageRoom> {
        self.rooms.iter().find(|r| r.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MessageRoom> {
        self.rooms.iter_mut().find(|r| r.name == name)
    }

    /// Returns the named room, creating it if needed.
    pub fn open(&mut self, name: &str) -> &mut MessageRoom {
        if let Some(index) = self.rooms.iter().position(|r| r.name == name) {
            &mut self.rooms[index]
        } else {
            self.rooms.push(MessageRoom::new(name));
            let last = self.rooms.len() - 1;
            &mut self.rooms[last]
        }
    }

    pub fn remove_everywhere(&mut self, username: &str) {
        for room in &mut self.rooms {
            room.remove_member(username);
        }
    }

    pub fn rebind(&mut self, user: &User) {
        for room in &mut self.rooms {
            room.rebind(user);
        }
    }

    pub fn clear(&mut self) {
        self.rooms.clear();
    }
}
